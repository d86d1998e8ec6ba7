// Explain every matching file under a path in one Markdown report

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use codenote_pipeline::{partition_known_languages, ConfigOverrides, ExplanationReport, FilePipeline};

use super::{run_outcome, Command};
use crate::{
    context::{cancellation_token, RunContext},
    error::CliResult,
    output,
    progress::FileProgress,
};

pub struct ExplainCommand {
    path: PathBuf,
    report_path: PathBuf,
    overrides: ConfigOverrides,
    config_path: Option<PathBuf>,
    strict: bool,
    max_runtime_secs: Option<u64>,
}

impl ExplainCommand {
    pub fn new(path: PathBuf, report_path: PathBuf, overrides: ConfigOverrides) -> Self {
        Self {
            path,
            report_path,
            overrides,
            config_path: None,
            strict: false,
            max_runtime_secs: None,
        }
    }

    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_runtime(mut self, secs: Option<u64>) -> Self {
        self.max_runtime_secs = secs;
        self
    }
}

#[async_trait]
impl Command for ExplainCommand {
    async fn execute(&self) -> CliResult<()> {
        let config = RunContext::load_config(self.config_path.as_deref(), self.overrides.clone())?;
        let (ctx, entries) = RunContext::prepare(config, &self.path).await?;

        let (entries, unknown) = partition_known_languages(entries);
        if !unknown.is_empty() {
            output::print_warning(&format!(
                "Skipping {} file(s) with an unrecognised language",
                unknown.len()
            ));
        }
        if entries.is_empty() {
            output::print_warning("No files to explain");
            return Ok(());
        }

        let progress = Arc::new(FileProgress::new(entries.len(), "Explaining"));
        let pipeline = FilePipeline::explain(ctx.client.clone(), ctx.model.clone(), &ctx.config)?
            .with_cancellation(cancellation_token(self.max_runtime_secs))
            .with_observer(progress.clone());
        let summary = pipeline.run(&entries).await;
        progress.finish();

        let report = ExplanationReport::from_summary(&ctx.root, &summary);
        report.write(&self.report_path).await?;
        output::print_success(&format!(
            "Wrote {} explanation(s) to {}",
            report.len(),
            self.report_path.display()
        ));

        output::print_summary(&summary);
        run_outcome(&summary, self.strict)
    }
}
