use std::path::PathBuf;

use thiserror::Error;

pub type ChunkingResult<T> = Result<T, ChunkingError>;

#[derive(Debug, Error)]
pub enum ChunkingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File is not valid UTF-8 text: {path}")]
    Decode { path: PathBuf },

    #[error("Input path does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Maximum chunk size must be positive")]
    InvalidChunkSize,

    #[error("Chunk {sequence} failed and fallback is disabled: {reason}")]
    ChunkFailed { sequence: usize, reason: String },

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Ignore walk error: {0}")]
    Ignore(#[from] ignore::Error),
}
