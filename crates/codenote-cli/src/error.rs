// CLI error types and exit codes

use codenote_chunking::ChunkingError;
use codenote_ollama::AnnotationError;
use codenote_pipeline::PipelineError;
use thiserror::Error;

/// Exit status for a run stopped by Ctrl-C or the runtime limit
pub const EXIT_CANCELLED: i32 = 130;

/// Exit status for `--strict` runs with failed files
pub const EXIT_FILES_FAILED: i32 = 2;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Annotation service unreachable at {url}: {message}")]
    ServiceUnavailable { url: String, message: String },

    #[error("Model '{model}' is not available")]
    ModelNotFound { model: String, available: Vec<String> },

    #[error("Annotation service error: {0}")]
    Service(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("{failed} file(s) failed")]
    FilesFailed { failed: usize },

    #[error("Cancelled")]
    Cancelled,
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nCheck ~/.codenote/config.yaml, .codenote/config.yaml and CODENOTE_* variables.",
                    msg
                )
            }
            CliError::ServiceUnavailable { url, message } => {
                format!(
                    "Cannot reach Ollama at {} ({}).\n\nStart it with 'ollama serve' or point --base-url at a running server.",
                    url, message
                )
            }
            CliError::ModelNotFound { model, available } => {
                let mut msg = format!(
                    "Model '{}' is not registered with Ollama.\n\nPull it with 'ollama pull {}'.",
                    model, model
                );
                if !available.is_empty() {
                    msg.push_str("\n\nAvailable models:");
                    for name in available {
                        msg.push_str("\n  • ");
                        msg.push_str(name);
                    }
                }
                msg
            }
            CliError::Service(msg) => format!("Annotation service error: {}", msg),
            CliError::Discovery(msg) => format!("Could not collect source files: {}", msg),
            CliError::Output(msg) => format!("Could not write output: {}", msg),
            CliError::FilesFailed { failed } => {
                format!("{} file(s) failed and --strict was given.", failed)
            }
            CliError::Cancelled => "Run cancelled; unfinished files were not written.".to_string(),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::FilesFailed { .. } => EXIT_FILES_FAILED,
            CliError::Cancelled => EXIT_CANCELLED,
            _ => 1,
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

impl From<AnnotationError> for CliError {
    fn from(err: AnnotationError) -> Self {
        match err {
            AnnotationError::Unreachable { url, message } => {
                CliError::ServiceUnavailable { url, message }
            }
            AnnotationError::ModelNotFound { model, available } => {
                CliError::ModelNotFound { model, available }
            }
            AnnotationError::InvalidModelName(msg) | AnnotationError::ConfigError(msg) => {
                CliError::Config(msg)
            }
            other => CliError::Service(other.to_string()),
        }
    }
}

impl From<ChunkingError> for CliError {
    fn from(err: ChunkingError) -> Self {
        match err {
            ChunkingError::InvalidChunkSize => CliError::Config(err.to_string()),
            other => CliError::Discovery(other.to_string()),
        }
    }
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Config(msg) => CliError::Config(msg),
            PipelineError::ConfigIo { .. } | PipelineError::ConfigParse { .. } => {
                CliError::Config(err.to_string())
            }
            PipelineError::Chunking(e) => e.into(),
            PipelineError::Annotation(e) => e.into(),
            PipelineError::Write { .. } => CliError::Output(err.to_string()),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
