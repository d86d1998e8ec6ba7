// Shared setup for commands that run the pipeline

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use codenote_chunking::{FileDiscoverer, FileEntry};
use codenote_ollama::{AvailabilityGate, OllamaClient};
use codenote_pipeline::{CodenoteConfig, ConfigOverrides};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{error::CliResult, progress};

/// Everything a pipeline command needs once the preconditions hold.
pub struct RunContext {
    pub config: CodenoteConfig,
    pub client: Arc<OllamaClient>,
    /// Registered model name accepted by the availability gate
    pub model: String,
    pub root: PathBuf,
}

impl RunContext {
    /// Resolve configuration from every layer, command-line overrides last.
    pub fn load_config(
        config_path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> CliResult<CodenoteConfig> {
        let mut config = CodenoteConfig::load_with_precedence(config_path)?;
        config.apply_overrides(overrides);
        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    /// Run the availability gate, then discover files under `root`.
    ///
    /// The gate runs first so a missing service or model fails the run
    /// before any file is read.
    pub async fn prepare(
        config: CodenoteConfig,
        root: &Path,
    ) -> CliResult<(Self, Vec<FileEntry>)> {
        let client = OllamaClient::with_timeout(config.base_url.clone(), config.timeout())?;

        let spinner = progress::create_spinner(&format!(
            "Checking {} at {}",
            config.model, config.base_url
        ));
        let gate = AvailabilityGate::new(config.model_match);
        let verified = gate.verify(&client, &config.model).await;
        spinner.finish_and_clear();
        let model = verified?;
        if model != config.model {
            info!(requested = %config.model, resolved = %model, "Using registered model name");
        }

        let discoverer = FileDiscoverer::new(config.discovery_config()?);
        let entries = discoverer.discover(root)?;
        info!(root = %root.display(), files = entries.len(), "Discovered files");

        // Discovery yields canonical paths; keep the root comparable to them.
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        Ok((
            Self {
                config,
                client: Arc::new(client),
                model,
                root,
            },
            entries,
        ))
    }
}

/// Token tripped by Ctrl-C or, when given, after `max_runtime_secs`.
pub fn cancellation_token(max_runtime_secs: Option<u64>) -> CancellationToken {
    let token = CancellationToken::new();

    let on_signal = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        warn!("Interrupt received, finishing the current chunk");
                        on_signal.cancel();
                    }
                    Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
                }
            }
            _ = on_signal.cancelled() => {}
        }
    });

    if let Some(secs) = max_runtime_secs {
        let on_deadline = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    warn!("Runtime limit of {}s reached, stopping", secs);
                    on_deadline.cancel();
                }
                _ = on_deadline.cancelled() => {}
            }
        });
    }

    token
}
