// Logging and verbosity control

use std::sync::atomic::{AtomicU8, Ordering};

use tracing_subscriber::EnvFilter;

/// Global verbosity level for user-facing stdout output
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Default log filter when neither flags nor RUST_LOG say otherwise
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Quiet mode - errors and the final summary only
    Quiet = 0,
    /// Normal mode - standard output
    Normal = 1,
    /// Verbose mode - per-file detail
    Verbose = 2,
}

impl VerbosityLevel {
    /// Get the current verbosity level
    pub fn current() -> Self {
        match VERBOSITY.load(Ordering::Relaxed) {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Normal,
            _ => VerbosityLevel::Verbose,
        }
    }

    /// Set the verbosity level
    pub fn set(level: Self) {
        VERBOSITY.store(level as u8, Ordering::Relaxed);
    }

    /// Check if we should output at this level
    pub fn should_output(&self) -> bool {
        self <= &Self::current()
    }
}

/// Resolve the tracing filter directive from CLI flags.
///
/// An explicit `--log-level` wins over `-v`/`-q`.
pub fn filter_directive(verbose: bool, quiet: bool, log_level: Option<&str>) -> String {
    match log_level {
        Some(level) => level.to_lowercase(),
        None if quiet => "error".to_string(),
        None if verbose => "debug".to_string(),
        None => DEFAULT_LOG_LEVEL.to_string(),
    }
}

/// Initialize logging based on CLI flags
///
/// Diagnostics go to stderr through `tracing`; RUST_LOG, when set,
/// replaces the flag-derived filter.
pub fn init_logging(verbose: bool, quiet: bool, log_level: Option<&str>) {
    let level = if quiet {
        VerbosityLevel::Quiet
    } else if verbose {
        VerbosityLevel::Verbose
    } else {
        VerbosityLevel::Normal
    };
    VerbosityLevel::set(level);

    let directive = filter_directive(verbose, quiet, log_level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}
