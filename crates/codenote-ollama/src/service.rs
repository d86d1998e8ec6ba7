//! The annotation service seam
//!
//! The pipeline depends on [`AnnotationService`] rather than on
//! [`OllamaClient`] directly, so the network can be swapped out in tests.

use async_trait::async_trait;

use crate::{
    client::OllamaClient,
    models::{GenerateOptions, GenerateRequest},
    prompt::PromptEnvelope,
    Result,
};

/// One chunk plus everything needed to wrap it in a prompt.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationRequest<'a> {
    pub text: &'a str,
    pub model: &'a str,
    pub language_hint: &'a str,
    pub envelope: PromptEnvelope,
}

impl<'a> AnnotationRequest<'a> {
    /// Build the wire request for this chunk.
    pub fn to_generate_request(&self) -> GenerateRequest {
        GenerateRequest {
            model: self.model.to_string(),
            system: self.envelope.system_prompt(self.language_hint),
            prompt: self.envelope.user_prompt(self.language_hint, self.text),
            stream: false,
            options: GenerateOptions {
                temperature: self.envelope.temperature,
            },
        }
    }
}

/// A stateless text-generation backend.
#[async_trait]
pub trait AnnotationService: Send + Sync {
    /// Annotate (or explain) a single chunk. Implementations issue one
    /// request and do not retry.
    async fn annotate(&self, request: AnnotationRequest<'_>) -> Result<String>;

    /// Whether the service answers at all.
    async fn is_reachable(&self) -> bool;

    /// Names of the models the service has registered.
    async fn registered_models(&self) -> Result<Vec<String>>;

    /// Where the service lives, for messages.
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl AnnotationService for OllamaClient {
    async fn annotate(&self, request: AnnotationRequest<'_>) -> Result<String> {
        self.generate(&request.to_generate_request()).await
    }

    async fn is_reachable(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    async fn registered_models(&self) -> Result<Vec<String>> {
        Ok(self
            .list_models()
            .await?
            .into_iter()
            .map(|model| model.name)
            .collect())
    }

    fn endpoint(&self) -> &str {
        self.base_url()
    }
}
