// Annotate every matching file under a path

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use codenote_pipeline::{ConfigOverrides, FilePipeline, OutputNaming};

use super::{run_outcome, Command};
use crate::{
    context::{cancellation_token, RunContext},
    error::CliResult,
    output::{self, OutputStyle},
    progress::FileProgress,
};

pub struct AnnotateCommand {
    path: PathBuf,
    overrides: ConfigOverrides,
    config_path: Option<PathBuf>,
    dry_run: bool,
    strict: bool,
    max_runtime_secs: Option<u64>,
}

impl AnnotateCommand {
    pub fn new(path: PathBuf, overrides: ConfigOverrides) -> Self {
        Self {
            path,
            overrides,
            config_path: None,
            dry_run: false,
            strict: false,
            max_runtime_secs: None,
        }
    }

    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
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
impl Command for AnnotateCommand {
    async fn execute(&self) -> CliResult<()> {
        let config = RunContext::load_config(self.config_path.as_deref(), self.overrides.clone())?;
        let (ctx, entries) = RunContext::prepare(config, &self.path).await?;

        if entries.is_empty() {
            output::print_warning(&format!(
                "No files matching {} under {}",
                ctx.config.extensions.join(", "),
                ctx.root.display()
            ));
            return Ok(());
        }

        let naming = OutputNaming::new(
            &ctx.config.output_marker,
            &ctx.root,
            ctx.config.output_dir.clone(),
        );
        let pipeline = FilePipeline::annotate(ctx.client.clone(), ctx.model.clone(), &ctx.config, naming)?;

        if self.dry_run {
            let planned = pipeline.plan(&entries).await;
            println!("{}", OutputStyle::default().plan(&planned));
            return Ok(());
        }

        output::print_info(&format!(
            "Annotating {} file(s) with {}",
            entries.len(),
            ctx.model
        ));

        let progress = Arc::new(FileProgress::new(entries.len(), "Annotating"));
        let pipeline = pipeline
            .with_cancellation(cancellation_token(self.max_runtime_secs))
            .with_observer(progress.clone());
        let summary = pipeline.run(&entries).await;
        progress.finish();

        output::print_summary(&summary);
        run_outcome(&summary, self.strict)
    }
}
