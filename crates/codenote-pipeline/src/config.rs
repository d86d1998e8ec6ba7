//! Layered configuration
//!
//! Values are resolved with the following precedence (lowest first):
//! 1. Built-in defaults
//! 2. Global config file (~/.codenote/config.yaml)
//! 3. Project config file (.codenote/config.yaml)
//! 4. An explicit `--config` file
//! 5. Environment variables
//! 6. Command-line overrides ([`ConfigOverrides`])
//!
//! The resolved [`CodenoteConfig`] is immutable for the rest of the run.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use codenote_chunking::{DiscoveryConfig, FallbackPolicy};
use codenote_ollama::{ModelMatch, PromptEnvelope, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{PipelineError, Result},
    retry::RetryPolicy,
};

pub const DEFAULT_MODEL: &str = "deepseek-coder-v2:16b";
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 4000;
const CONFIG_DIR: &str = ".codenote";
const CONFIG_FILE: &str = "config.yaml";

/// Marker inserted between the file stem and extension of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputMarker {
    /// `YYYYmmdd-HHMMSS`, captured once per run.
    #[default]
    Timestamp,
    Literal(String),
}

impl From<String> for OutputMarker {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("timestamp") {
            OutputMarker::Timestamp
        } else {
            OutputMarker::Literal(value)
        }
    }
}

impl From<OutputMarker> for String {
    fn from(marker: OutputMarker) -> Self {
        marker.to_string()
    }
}

impl fmt::Display for OutputMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMarker::Timestamp => f.write_str("timestamp"),
            OutputMarker::Literal(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodenoteConfig {
    /// Base URL for the Ollama API (default: http://localhost:11434)
    pub base_url: String,
    /// Model identifier (default: deepseek-coder-v2:16b)
    pub model: String,
    /// Per-request timeout in seconds (default: 300)
    pub timeout_secs: u64,
    /// Maximum chunk size in bytes (default: 4000)
    pub max_chunk_size: usize,
    pub extensions: Vec<String>,
    pub annotate_temperature: f32,
    pub explain_temperature: f32,
    /// Extra attempts per chunk on transient failures (default: 0)
    pub chunk_retries: u32,
    pub retry_backoff_ms: u64,
    pub on_chunk_failure: FallbackPolicy,
    pub model_match: ModelMatch,
    pub output_marker: OutputMarker,
    pub output_dir: Option<PathBuf>,
    /// Files processed concurrently; also bounds concurrent requests (default: 1)
    pub jobs: usize,
    pub follow_symlinks: bool,
    pub respect_ignore_files: bool,
    pub exclude: Vec<String>,
}

impl Default for CodenoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 300,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            extensions: DiscoveryConfig::default().extensions,
            annotate_temperature: codenote_ollama::prompt::DEFAULT_ANNOTATE_TEMPERATURE,
            explain_temperature: codenote_ollama::prompt::DEFAULT_EXPLAIN_TEMPERATURE,
            chunk_retries: 0,
            retry_backoff_ms: 500,
            on_chunk_failure: FallbackPolicy::Fallback,
            model_match: ModelMatch::Exact,
            output_marker: OutputMarker::Timestamp,
            output_dir: None,
            jobs: 1,
            follow_symlinks: false,
            respect_ignore_files: true,
            exclude: Vec::new(),
        }
    }
}

/// On-disk layout: every key optional, nested under `codenote:`.
#[derive(Debug, Default, Deserialize)]
struct CodenoteFileConfig {
    codenote: Option<PartialConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialConfig {
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_chunk_size: Option<usize>,
    extensions: Option<Vec<String>>,
    annotate_temperature: Option<f32>,
    explain_temperature: Option<f32>,
    chunk_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
    on_chunk_failure: Option<FallbackPolicy>,
    model_match: Option<ModelMatch>,
    output_marker: Option<OutputMarker>,
    output_dir: Option<PathBuf>,
    jobs: Option<usize>,
    follow_symlinks: Option<bool>,
    respect_ignore_files: Option<bool>,
    exclude: Option<Vec<String>>,
}

/// Values supplied on the command line; `None` leaves the layer below intact.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_chunk_size: Option<usize>,
    pub extensions: Option<Vec<String>>,
    pub chunk_retries: Option<u32>,
    pub on_chunk_failure: Option<FallbackPolicy>,
    pub model_match: Option<ModelMatch>,
    pub output_marker: Option<OutputMarker>,
    pub output_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub respect_ignore_files: Option<bool>,
    pub exclude: Option<Vec<String>>,
}

impl CodenoteConfig {
    /// Resolve configuration from every layer except command-line overrides.
    pub fn load_with_precedence(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                debug!("Loading global config from {:?}", global);
                config.merge_from_file(&global)?;
            }
        }

        let project = Self::project_config_path();
        if project.exists() {
            debug!("Loading project config from {:?}", project);
            config.merge_from_file(&project)?;
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(PipelineError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading explicit config from {:?}", path);
            config.merge_from_file(path)?;
        }

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Global configuration path (~/.codenote/config.yaml)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Project configuration path (.codenote/config.yaml)
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Merge values present in a YAML file over the current configuration.
    pub fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        let file_config: CodenoteFileConfig =
            serde_yaml::from_str(&content).map_err(|source| PipelineError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(partial) = file_config.codenote {
            self.merge_partial(partial);
        }
        Ok(())
    }

    fn merge_partial(&mut self, partial: PartialConfig) {
        if let Some(v) = partial.base_url {
            self.base_url = v;
        }
        if let Some(v) = partial.model {
            self.model = v;
        }
        if let Some(v) = partial.timeout_secs {
            self.timeout_secs = v;
        }
        if let Some(v) = partial.max_chunk_size {
            self.max_chunk_size = v;
        }
        if let Some(v) = partial.extensions {
            self.extensions = v;
        }
        if let Some(v) = partial.annotate_temperature {
            self.annotate_temperature = v;
        }
        if let Some(v) = partial.explain_temperature {
            self.explain_temperature = v;
        }
        if let Some(v) = partial.chunk_retries {
            self.chunk_retries = v;
        }
        if let Some(v) = partial.retry_backoff_ms {
            self.retry_backoff_ms = v;
        }
        if let Some(v) = partial.on_chunk_failure {
            self.on_chunk_failure = v;
        }
        if let Some(v) = partial.model_match {
            self.model_match = v;
        }
        if let Some(v) = partial.output_marker {
            self.output_marker = v;
        }
        if partial.output_dir.is_some() {
            self.output_dir = partial.output_dir;
        }
        if let Some(v) = partial.jobs {
            self.jobs = v;
        }
        if let Some(v) = partial.follow_symlinks {
            self.follow_symlinks = v;
        }
        if let Some(v) = partial.respect_ignore_files {
            self.respect_ignore_files = v;
        }
        if let Some(v) = partial.exclude {
            self.exclude = v;
        }
    }

    /// Environment variables override any file configuration.
    pub fn load_from_env(&mut self) {
        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            debug!("Loading OLLAMA_BASE_URL from environment: {}", url);
            self.base_url = url;
        }

        if let Ok(model) = std::env::var("CODENOTE_MODEL") {
            debug!("Loading CODENOTE_MODEL from environment: {}", model);
            self.model = model;
        }

        if let Ok(value) = std::env::var("CODENOTE_TIMEOUT_SECS") {
            match value.parse::<u64>() {
                Ok(timeout) => self.timeout_secs = timeout,
                Err(_) => warn!("Invalid CODENOTE_TIMEOUT_SECS value: {}", value),
            }
        }

        if let Ok(value) = std::env::var("CODENOTE_MAX_CHUNK_SIZE") {
            match value.parse::<usize>() {
                Ok(size) => self.max_chunk_size = size,
                Err(_) => warn!("Invalid CODENOTE_MAX_CHUNK_SIZE value: {}", value),
            }
        }
    }

    /// Apply command-line overrides. Call [`validate`](Self::validate) afterwards.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides {
            base_url,
            model,
            timeout_secs,
            max_chunk_size,
            extensions,
            chunk_retries,
            on_chunk_failure,
            model_match,
            output_marker,
            output_dir,
            jobs,
            respect_ignore_files,
            exclude,
        } = overrides;

        self.merge_partial(PartialConfig {
            base_url,
            model,
            timeout_secs,
            max_chunk_size,
            extensions,
            chunk_retries,
            on_chunk_failure,
            model_match,
            output_marker,
            output_dir,
            jobs,
            respect_ignore_files,
            exclude,
            ..PartialConfig::default()
        });
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(PipelineError::Config("base URL cannot be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(PipelineError::Config(format!(
                "base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(PipelineError::Config("model cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(PipelineError::Config("timeout must be greater than 0".to_string()));
        }
        if self.max_chunk_size == 0 {
            return Err(PipelineError::Config(
                "max chunk size must be greater than 0".to_string(),
            ));
        }
        if self.jobs == 0 {
            return Err(PipelineError::Config("jobs must be at least 1".to_string()));
        }
        if self.extensions.iter().all(|ext| ext.trim().trim_start_matches('.').is_empty()) {
            return Err(PipelineError::Config(
                "at least one file extension is required".to_string(),
            ));
        }
        for (name, value) in [
            ("annotate temperature", self.annotate_temperature),
            ("explain temperature", self.explain_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(PipelineError::Config(format!(
                    "{} must be between 0.0 and 2.0, got {}",
                    name, value
                )));
            }
        }
        if let OutputMarker::Literal(marker) = &self.output_marker {
            if marker.is_empty() || marker.contains(['/', '\\']) {
                return Err(PipelineError::Config(format!(
                    "output marker must be a non-empty file name fragment: {:?}",
                    marker
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.chunk_retries, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn annotate_envelope(&self) -> PromptEnvelope {
        PromptEnvelope::annotate(self.annotate_temperature)
    }

    pub fn explain_envelope(&self) -> PromptEnvelope {
        PromptEnvelope::explain(self.explain_temperature)
    }

    pub fn discovery_config(&self) -> Result<DiscoveryConfig> {
        let config = DiscoveryConfig {
            follow_symlinks: self.follow_symlinks,
            respect_ignore_files: self.respect_ignore_files,
            ..DiscoveryConfig::default()
        }
        .with_extensions(&self.extensions)
        .with_excludes(&self.exclude)?;
        Ok(config)
    }
}
