// Command handlers for the codenote CLI

pub mod annotate;
pub mod explain;
pub mod models;

pub use annotate::AnnotateCommand;
pub use explain::ExplainCommand;
pub use models::ModelsCommand;

use codenote_pipeline::RunSummary;

use crate::error::{CliError, CliResult};

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}

/// Map a finished run to the command result.
///
/// Per-file failures only affect the exit status under `--strict`;
/// cancellation always does.
pub fn run_outcome(summary: &RunSummary, strict: bool) -> CliResult<()> {
    if summary.cancelled {
        return Err(CliError::Cancelled);
    }
    let failed = summary.failed().count();
    if strict && failed > 0 {
        return Err(CliError::FilesFailed { failed });
    }
    Ok(())
}
