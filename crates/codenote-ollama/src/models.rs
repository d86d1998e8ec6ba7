//! Wire types for the Ollama API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A model registered with the Ollama server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredModel {
    /// Model name with tag (e.g., "deepseek-coder-v2:16b")
    pub name: String,

    /// Model size in bytes
    #[serde(default)]
    pub size: u64,

    /// Model digest/hash
    #[serde(default)]
    pub digest: String,

    /// When the model was last modified
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Body of `GET /api/tags`
#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    pub models: Option<Vec<RegisteredModel>>,
}

/// Decoding options sent with a generate request
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
}

/// Body of `POST /api/generate`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Non-streaming response of `POST /api/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub done: bool,
}
