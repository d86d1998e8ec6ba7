//! Error types for annotation service operations

use thiserror::Error;

/// Errors that can occur while talking to the annotation service
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Annotation service unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Model '{model}' is not registered with the annotation service")]
    ModelNotFound {
        model: String,
        available: Vec<String>,
    },

    #[error("Invalid model name: {0}")]
    InvalidModelName(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse service response: {0}")]
    ParseError(String),

    #[error("Service returned an empty response")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AnnotationError {
    /// Whether a later attempt at the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AnnotationError::Timeout(_)
            | AnnotationError::NetworkError(_)
            | AnnotationError::Unreachable { .. } => true,
            AnnotationError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AnnotationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnnotationError::Timeout(err.to_string())
        } else if err.is_decode() {
            AnnotationError::ParseError(err.to_string())
        } else if let Some(status) = err.status() {
            AnnotationError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            AnnotationError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AnnotationError {
    fn from(err: serde_json::Error) -> Self {
        AnnotationError::ParseError(err.to_string())
    }
}
