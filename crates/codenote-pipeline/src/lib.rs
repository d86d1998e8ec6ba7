//! File pipeline for codenote
//!
//! Reads each discovered file, chunks it, sends chunks one at a time to the
//! annotation service, reassembles the results and writes one artifact per
//! file. Failures are absorbed at the narrowest scope: a failed chunk falls
//! back to its original text, a failed file is reported and skipped, and the
//! run carries on.

pub mod config;
pub mod error;
pub mod explain;
pub mod orchestrator;
pub mod output;
pub mod report;
pub mod retry;

pub use config::{CodenoteConfig, ConfigOverrides, OutputMarker};
pub use error::{PipelineError, Result};
pub use explain::{partition_known_languages, ExplanationReport, DEFAULT_REPORT_FILE};
pub use orchestrator::{FilePipeline, NoopObserver, PipelineMode, PipelineObserver, PlannedFile};
pub use output::{ArtifactWriter, OutputNaming};
pub use report::{FileReport, FileStage, FileState, RunSummary};
pub use retry::RetryPolicy;
