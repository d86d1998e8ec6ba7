// List models registered with the Ollama server

use std::path::PathBuf;

use async_trait::async_trait;
use codenote_ollama::{OllamaClient, RegisteredModel};
use codenote_pipeline::{CodenoteConfig, ConfigOverrides};

use super::Command;
use crate::{
    context::RunContext,
    error::CliResult,
    output::{self, OutputStyle},
};

pub struct ModelsCommand {
    base_url: Option<String>,
    config_path: Option<PathBuf>,
}

impl ModelsCommand {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    fn format_size(bytes: u64) -> String {
        const GB: f64 = 1024.0 * 1024.0 * 1024.0;
        const MB: f64 = 1024.0 * 1024.0;
        let bytes = bytes as f64;
        if bytes >= GB {
            format!("{:.1} GB", bytes / GB)
        } else {
            format!("{:.0} MB", bytes / MB)
        }
    }

    pub fn format_model(model: &RegisteredModel, configured: &str) -> String {
        let marker = if model.name == configured { " (configured)" } else { "" };
        format!("{}  {}{}", model.name, Self::format_size(model.size), marker)
    }
}

#[async_trait]
impl Command for ModelsCommand {
    async fn execute(&self) -> CliResult<()> {
        let overrides = ConfigOverrides {
            base_url: self.base_url.clone(),
            ..ConfigOverrides::default()
        };
        let config: CodenoteConfig = RunContext::load_config(self.config_path.as_deref(), overrides)?;
        let client = OllamaClient::with_timeout(config.base_url.clone(), config.timeout())?;

        let models = client.list_models().await?;
        if models.is_empty() {
            output::print_warning(&format!(
                "No models registered at {}. Pull one with 'ollama pull {}'.",
                client.base_url(),
                config.model
            ));
            return Ok(());
        }

        let style = OutputStyle::default();
        println!("{}", style.header(&format!("Models at {}", client.base_url())));
        for model in &models {
            println!("{}", style.list_item(&Self::format_model(model, &config.model)));
        }
        Ok(())
    }
}
