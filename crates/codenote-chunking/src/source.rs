use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    errors::{ChunkingError, ChunkingResult},
    language::{LanguageDetector, LanguageKind},
};

/// One discovered file together with its content, loaded once.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// Extension without the leading dot; empty when the file has none.
    pub extension: String,
    pub language: Option<LanguageKind>,
    /// Prompt label: the language label or the upper-cased extension.
    pub language_hint: String,
    pub content: String,
}

impl SourceUnit {
    /// Read and decode `path` as UTF-8.
    pub async fn load(path: &Path) -> ChunkingResult<Self> {
        let bytes = fs::read(path).await.map_err(|source| ChunkingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|_| ChunkingError::Decode {
            path: path.to_path_buf(),
        })?;
        Ok(Self::from_content(path, content))
    }

    pub fn from_content(path: &Path, content: String) -> Self {
        let detector = LanguageDetector;
        Self {
            path: path.to_path_buf(),
            extension: path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default()
                .to_string(),
            language: detector.detect(path, &content),
            language_hint: detector.hint(path, &content),
            content,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
