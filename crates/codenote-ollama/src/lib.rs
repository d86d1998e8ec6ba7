//! Ollama integration for codenote
//!
//! This crate talks to a local Ollama server: it lists registered models,
//! checks reachability, and sends one chunk at a time to `/api/generate`
//! wrapped in a fixed instructional envelope. It never retries on its own;
//! retry policy belongs to the caller.

pub mod client;
pub mod error;
pub mod gate;
pub mod models;
pub mod prompt;
pub mod service;

pub use client::{OllamaClient, DEFAULT_BASE_URL};
pub use error::AnnotationError;
pub use gate::{AvailabilityGate, ModelMatch};
pub use models::{GenerateOptions, GenerateRequest, GenerateResponse, RegisteredModel};
pub use prompt::{PromptEnvelope, PromptKind};
pub use service::{AnnotationRequest, AnnotationService};

/// Result type for annotation operations
pub type Result<T> = std::result::Result<T, AnnotationError>;
