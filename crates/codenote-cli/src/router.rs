// Command routing and dispatch

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use codenote_chunking::FallbackPolicy;
use codenote_ollama::ModelMatch;
use codenote_pipeline::{ConfigOverrides, OutputMarker, DEFAULT_REPORT_FILE};

use crate::commands::{AnnotateCommand, Command, ExplainCommand, ModelsCommand};
use crate::error::CliResult;

/// codenote - add comments to source code with a local Ollama model
#[derive(Parser, Debug)]
#[command(name = "codenote")]
#[command(bin_name = "codenote")]
#[command(about = "Annotate source files with comments from a local Ollama model")]
#[command(
    long_about = "codenote walks a directory, splits each source file into line-aligned chunks, asks a local Ollama model to comment every chunk, and writes the annotated copy next to the original as <name>_commented_<timestamp>.<ext>.\n\nOriginals are never modified."
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimize output (errors and the summary only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log filter (trace, debug, info, warn, error); overrides -v/-q
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Additional YAML config file, applied over the global and project files
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write an annotated copy of every matching file under PATH
    Annotate {
        /// Directory or single file to process
        #[arg(value_name = "PATH")]
        path: PathBuf,

        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Write artifacts under DIR, mirroring the source tree
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Literal marker used instead of the run timestamp
        #[arg(long, value_name = "LITERAL")]
        suffix: Option<String>,

        /// Check the service and list what would be sent, without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a Markdown report explaining every matching file under PATH
    Explain {
        /// Directory or single file to process
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Report file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_REPORT_FILE)]
        output: PathBuf,

        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List models registered with the Ollama server
    Models {
        /// Ollama base URL
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },
}

/// Where the service lives and which model to use
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Model to use (default: deepseek-coder-v2:16b)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// How the requested model is matched against registered names
    #[arg(long, value_enum)]
    pub model_match: Option<ModelMatchArg>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

/// Discovery and pipeline tuning shared by annotate and explain
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// File extensions to include (e.g. -e py js)
    #[arg(short, long = "extensions", value_name = "EXT", num_args = 1.., value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Glob patterns to exclude
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Do not honour .gitignore and .ignore files
    #[arg(long)]
    pub no_ignore: bool,

    /// Maximum chunk size in bytes
    #[arg(long, value_name = "N")]
    pub max_chunk_size: Option<usize>,

    /// Number of files processed concurrently
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Extra attempts per chunk on transient errors
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// What to do when a chunk cannot be annotated
    #[arg(long, value_enum)]
    pub on_chunk_failure: Option<ChunkFailureArg>,

    /// Stop scheduling work after this many seconds
    #[arg(long, value_name = "SECS")]
    pub max_runtime_secs: Option<u64>,

    /// Exit with status 2 when any file fails
    #[arg(long)]
    pub strict: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMatchArg {
    Exact,
    Substring,
}

impl From<ModelMatchArg> for ModelMatch {
    fn from(arg: ModelMatchArg) -> Self {
        match arg {
            ModelMatchArg::Exact => ModelMatch::Exact,
            ModelMatchArg::Substring => ModelMatch::Substring,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFailureArg {
    Fallback,
    FailFile,
}

impl From<ChunkFailureArg> for FallbackPolicy {
    fn from(arg: ChunkFailureArg) -> Self {
        match arg {
            ChunkFailureArg::Fallback => FallbackPolicy::Fallback,
            ChunkFailureArg::FailFile => FallbackPolicy::FailFile,
        }
    }
}

/// Fold command-line values into config overrides. Unset flags leave the
/// lower layers untouched.
pub fn build_overrides(service: &ServiceArgs, run: &RunArgs) -> ConfigOverrides {
    ConfigOverrides {
        base_url: service.base_url.clone(),
        model: service.model.clone(),
        timeout_secs: service.timeout_secs,
        max_chunk_size: run.max_chunk_size,
        extensions: (!run.extensions.is_empty()).then(|| run.extensions.clone()),
        chunk_retries: run.retries,
        on_chunk_failure: run.on_chunk_failure.map(Into::into),
        model_match: service.model_match.map(Into::into),
        jobs: run.jobs,
        respect_ignore_files: run.no_ignore.then_some(false),
        exclude: (!run.exclude.is_empty()).then(|| run.exclude.clone()),
        ..ConfigOverrides::default()
    }
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();

        crate::logging::init_logging(cli.verbose, cli.quiet, cli.log_level.as_deref());

        Self::execute(&cli).await
    }

    /// Execute a command
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        let config_path = cli.config.clone();

        match &cli.command {
            Commands::Annotate {
                path,
                service,
                run,
                output_dir,
                suffix,
                dry_run,
            } => {
                let mut overrides = build_overrides(service, run);
                overrides.output_dir = output_dir.clone();
                overrides.output_marker = suffix.clone().map(OutputMarker::from);

                let cmd = AnnotateCommand::new(path.clone(), overrides)
                    .with_config_path(config_path)
                    .with_dry_run(*dry_run)
                    .with_strict(run.strict)
                    .with_max_runtime(run.max_runtime_secs);
                cmd.execute().await
            }
            Commands::Explain {
                path,
                output,
                service,
                run,
            } => {
                let overrides = build_overrides(service, run);
                let cmd = ExplainCommand::new(path.clone(), output.clone(), overrides)
                    .with_config_path(config_path)
                    .with_strict(run.strict)
                    .with_max_runtime(run.max_runtime_secs);
                cmd.execute().await
            }
            Commands::Models { base_url } => {
                let cmd = ModelsCommand::new(base_url.clone()).with_config_path(config_path);
                cmd.execute().await
            }
        }
    }
}
