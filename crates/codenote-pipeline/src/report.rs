//! Per-file states and the end-of-run summary

use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Step of the per-file pipeline at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    Read,
    Annotate,
    Reassemble,
    Write,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStage::Read => "read",
            FileStage::Annotate => "annotate",
            FileStage::Reassemble => "reassemble",
            FileStage::Write => "write",
        };
        f.write_str(name)
    }
}

/// `Discovered -> Read -> Chunked -> Annotating(i/n) -> Reassembled -> Written`,
/// with `Failed` reachable from any step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Discovered,
    Read,
    Chunked { total: usize },
    Annotating { done: usize, total: usize },
    Reassembled,
    Written { artifact: PathBuf },
    Failed { stage: FileStage, reason: String },
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileState::Discovered => f.write_str("discovered"),
            FileState::Read => f.write_str("read"),
            FileState::Chunked { total } => write!(f, "chunked ({} chunks)", total),
            FileState::Annotating { done, total } => write!(f, "annotating ({}/{})", done, total),
            FileState::Reassembled => f.write_str("reassembled"),
            FileState::Written { artifact } => write!(f, "written to {}", artifact.display()),
            FileState::Failed { stage, reason } => write!(f, "failed at {}: {}", stage, reason),
        }
    }
}

/// Final record for one processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub state: FileState,
    pub chunks: usize,
    /// Chunks whose original text was kept because annotation failed.
    pub fallback_chunks: Vec<usize>,
    /// Assembled explanation text (explain mode only).
    pub explanation: Option<String>,
}

impl FileReport {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            state: FileState::Discovered,
            chunks: 0,
            fallback_chunks: Vec::new(),
            explanation: None,
        }
    }

    pub fn fail(mut self, stage: FileStage, reason: impl fmt::Display) -> Self {
        self.state = FileState::Failed {
            stage,
            reason: reason.to_string(),
        };
        self
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, FileState::Failed { .. })
    }

    pub fn is_partial(&self) -> bool {
        !self.is_failed() && !self.fallback_chunks.is_empty()
    }

    pub fn artifact(&self) -> Option<&Path> {
        match &self.state {
            FileState::Written { artifact } => Some(artifact),
            _ => None,
        }
    }
}

/// Outcome of a whole run, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    /// Files never started because the run was cancelled.
    pub skipped: Vec<PathBuf>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| !r.is_failed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| r.is_failed())
    }

    pub fn partial_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_partial()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}
