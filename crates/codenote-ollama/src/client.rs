//! HTTP client for the Ollama API
//!
//! One request per call: listing models, a reachability probe, and a single
//! non-streaming generate request per chunk. The underlying `reqwest`
//! client is pooled and shared.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, warn};

use crate::{
    error::AnnotationError,
    models::{GenerateRequest, GenerateResponse, RegisteredModel, TagsResponse},
    Result,
};

/// Default Ollama endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default timeout for generate requests (5 minutes; large chunks are slow)
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default pool idle timeout (90 seconds)
const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Default TCP keep-alive interval (60 seconds)
const DEFAULT_TCP_KEEPALIVE_SECS: u64 = 60;

/// Health check timeout (5 seconds)
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Client for a single Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Arc<Client>,
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new client with a custom request timeout
    ///
    /// # Arguments
    /// * `base_url` - The Ollama server URL (e.g., "http://localhost:11434")
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    /// Returns `ConfigError` if base_url is empty
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AnnotationError::ConfigError(
                "Ollama base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT_SECS))
            .tcp_keepalive(Duration::from_secs(DEFAULT_TCP_KEEPALIVE_SECS))
            .build()
            .map_err(|e| AnnotationError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// List all registered models
    pub async fn list_models(&self) -> Result<Vec<RegisteredModel>> {
        debug!("Listing registered models");

        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                AnnotationError::Unreachable {
                    url: self.base_url.clone(),
                    message: e.to_string(),
                }
            } else {
                AnnotationError::from(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Failed to list models: {}", error_text);
            return Err(AnnotationError::Http {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            error!("Failed to parse tags response: {}", e);
            AnnotationError::ParseError(e.to_string())
        })?;

        let models = tags.models.unwrap_or_default();
        debug!("Listed {} models", models.len());
        Ok(models)
    }

    /// Check if the Ollama server is reachable and responding
    ///
    /// Uses a shorter timeout (5 seconds) than generate requests. Network
    /// errors are reported as `Ok(false)`, not as an error.
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Performing health check on Ollama server at {}", self.base_url);

        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(response) => {
                let healthy = response.status().is_success();
                if healthy {
                    debug!("Ollama server health check passed");
                } else {
                    warn!("Ollama server health check failed: HTTP {}", response.status());
                }
                Ok(healthy)
            }
            Err(e) => {
                warn!("Ollama server health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Send one generate request and return the generated text
    ///
    /// Exactly one HTTP request is issued; failures are returned to the
    /// caller, which decides whether to retry or fall back.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        if request.model.is_empty() {
            return Err(AnnotationError::InvalidModelName(
                "Model name cannot be empty".to_string(),
            ));
        }

        debug!(
            model = %request.model,
            prompt_bytes = request.prompt.len(),
            "Sending generate request"
        );

        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Ollama generate error ({}): {}", status, error_text);
            return Err(AnnotationError::Http {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            error!("Failed to parse generate response: {}", e);
            AnnotationError::ParseError(e.to_string())
        })?;

        if body.response.trim().is_empty() {
            return Err(AnnotationError::EmptyResponse);
        }

        Ok(body.response)
    }
}
