//! Artifact naming and atomic writes

use std::path::{Path, PathBuf};

use codenote_chunking::ARTIFACT_MARKER;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::OutputMarker,
    error::{PipelineError, Result},
};

/// Derives the artifact path for each source file.
///
/// `{stem}_commented_{marker}{.ext}` next to the source, or under
/// `output_dir` mirroring the source's path relative to the run root.
#[derive(Debug, Clone)]
pub struct OutputNaming {
    marker: String,
    base: PathBuf,
    output_dir: Option<PathBuf>,
}

impl OutputNaming {
    /// Resolves a timestamp marker immediately so every artifact of a run
    /// shares it.
    pub fn new(marker: &OutputMarker, root: &Path, output_dir: Option<PathBuf>) -> Self {
        let marker = match marker {
            OutputMarker::Timestamp => chrono::Local::now().format("%Y%m%d-%H%M%S").to_string(),
            OutputMarker::Literal(value) => value.clone(),
        };
        Self::with_resolved_marker(marker, root, output_dir)
    }

    pub fn with_resolved_marker(
        marker: impl Into<String>,
        root: &Path,
        output_dir: Option<PathBuf>,
    ) -> Self {
        let base = if root.is_file() {
            root.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            root.to_path_buf()
        };
        Self {
            marker: marker.into(),
            base,
            output_dir,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut file_name = format!("{}{}{}", stem, ARTIFACT_MARKER, self.marker);
        if let Some(ext) = source.extension() {
            file_name.push('.');
            file_name.push_str(&ext.to_string_lossy());
        }

        let source_dir = source.parent().unwrap_or_else(|| Path::new(""));
        let dir = match &self.output_dir {
            Some(output_dir) => match source_dir.strip_prefix(&self.base) {
                Ok(relative) => output_dir.join(relative),
                Err(_) => output_dir.clone(),
            },
            None => source_dir.to_path_buf(),
        };
        dir.join(file_name)
    }
}

/// Writes artifacts through a temporary sibling and an atomic rename, so a
/// reader never observes a partially written file.
#[derive(Debug, Clone, Default)]
pub struct ArtifactWriter;

impl ArtifactWriter {
    pub fn new() -> Self {
        ArtifactWriter
    }

    pub async fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.write_atomic(path, content)
            .await
            .map_err(|source| PipelineError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn write_atomic(&self, path: &Path, content: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.temp_path(path);
        if let Err(e) = fs::write(&temp_path, content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        debug!(path = %path.display(), bytes = content.len(), "Wrote artifact");
        Ok(())
    }

    fn temp_path(&self, path: &Path) -> PathBuf {
        let mut temp_path = path.to_path_buf();
        let file_name = format!(
            ".tmp-{}-{}",
            Uuid::new_v4(),
            path.file_name().and_then(|n| n.to_str()).unwrap_or("artifact")
        );
        temp_path.set_file_name(file_name);
        temp_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = ArtifactWriter::new().temp_path(Path::new("/out/main_commented_x.py"));

        assert_eq!(temp.parent(), Some(Path::new("/out")));
        let name = temp.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".tmp-"));
        assert!(name.ends_with("-main_commented_x.py"));
    }
}
