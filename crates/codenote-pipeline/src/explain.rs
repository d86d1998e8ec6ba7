//! Markdown report for explain runs

use std::path::{Path, PathBuf};

use codenote_chunking::{FileEntry, LanguageKind};
use tracing::warn;

use crate::{error::Result, output::ArtifactWriter, report::RunSummary};

pub const DEFAULT_REPORT_FILE: &str = "code_explanations.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationReport {
    base: PathBuf,
    sections: Vec<(String, String)>,
}

impl ExplanationReport {
    /// Section headings are paths relative to `root` (or to its parent when
    /// `root` is a single file).
    pub fn new(root: &Path) -> Self {
        let base = if root.is_file() {
            root.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            root.to_path_buf()
        };
        Self {
            base,
            sections: Vec::new(),
        }
    }

    /// Collect every successful explanation from a run, in run order.
    pub fn from_summary(root: &Path, summary: &RunSummary) -> Self {
        let mut report = Self::new(root);
        for file in summary.succeeded() {
            if let Some(explanation) = &file.explanation {
                report.push(&file.path, explanation);
            }
        }
        report
    }

    pub fn push(&mut self, path: &Path, explanation: &str) {
        let relative = path.strip_prefix(&self.base).unwrap_or(path);
        self.sections
            .push((relative.display().to_string(), explanation.trim().to_string()));
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("# Code Explanations\n\n");
        for (heading, explanation) in &self.sections {
            out.push_str("## ");
            out.push_str(heading);
            out.push('\n');
            out.push_str(explanation);
            out.push_str("\n\n");
        }
        out
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        ArtifactWriter::new().write(path, &self.render()).await
    }
}

/// Split entries into those with a known language and those without.
pub fn partition_known_languages(entries: Vec<FileEntry>) -> (Vec<FileEntry>, Vec<FileEntry>) {
    let (known, unknown): (Vec<_>, Vec<_>) = entries.into_iter().partition(|entry| {
        entry
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(LanguageKind::from_extension)
            .is_some()
    });

    for entry in &unknown {
        warn!(path = %entry.path.display(), "Skipping file with unknown language");
    }
    (known, unknown)
}
