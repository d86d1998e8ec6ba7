// Progress indicators

use std::{path::Path, time::Duration};

use codenote_pipeline::{FileReport, PipelineObserver};
use indicatif::{ProgressBar, ProgressStyle};

use crate::logging::VerbosityLevel;

/// Create a spinner for long-running operations
pub fn create_spinner(message: &str) -> ProgressBar {
    if !progress_enabled() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|e| {
            eprintln!("Failed to create spinner template: {}", e);
            ProgressStyle::default_spinner()
        });
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Create a progress bar for operations with known length
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    if !progress_enabled() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|e| {
            eprintln!("Failed to create progress bar template: {}", e);
            ProgressStyle::default_bar()
        })
        .progress_chars("=>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

fn progress_enabled() -> bool {
    VerbosityLevel::Normal.should_output() && atty::is(atty::Stream::Stderr)
}

/// Drives a file-level progress bar from pipeline events.
pub struct FileProgress {
    bar: ProgressBar,
}

impl FileProgress {
    pub fn new(total_files: usize, message: &str) -> Self {
        Self {
            bar: create_progress_bar(total_files as u64, message),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineObserver for FileProgress {
    fn file_started(&self, path: &Path, chunks: usize) {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        self.bar.set_message(format!("{} (0/{})", name, chunks));
    }

    fn chunk_finished(&self, path: &Path, done: usize, total: usize) {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        self.bar.set_message(format!("{} ({}/{})", name, done, total));
    }

    fn file_finished(&self, _report: &FileReport) {
        self.bar.inc(1);
    }
}
