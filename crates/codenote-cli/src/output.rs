// Output formatting and styling

use codenote_pipeline::{FileState, PlannedFile, RunSummary};
use colored::Colorize;

use crate::logging::VerbosityLevel;

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl OutputStyle {
    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format a list item
    pub fn list_item(&self, item: &str) -> String {
        format!("  • {}", item)
    }

    /// Format a key-value pair
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.use_colors {
            format!("  {}: {}", key.bold(), value)
        } else {
            format!("  {}: {}", key, value)
        }
    }

    /// Render the end-of-run summary: counts, then one line per failed or
    /// skipped file.
    pub fn run_summary(&self, summary: &RunSummary) -> String {
        let completed = summary.succeeded().count();
        let failed: Vec<_> = summary.failed().collect();

        let mut lines = vec![self.header("Summary")];
        lines.push(self.key_value("completed", &completed.to_string()));
        lines.push(self.key_value("partially annotated", &summary.partial_count().to_string()));
        lines.push(self.key_value("failed", &failed.len().to_string()));
        lines.push(self.key_value("skipped", &summary.skipped.len().to_string()));

        for report in &failed {
            if let FileState::Failed { stage, reason } = &report.state {
                lines.push(self.error(&format!(
                    "{} ({}): {}",
                    report.path.display(),
                    stage,
                    reason
                )));
            }
        }
        for report in summary.reports.iter().filter(|r| r.is_partial()) {
            let chunks: Vec<String> = report.fallback_chunks.iter().map(|c| c.to_string()).collect();
            lines.push(self.warning(&format!(
                "{}: original text kept for chunk(s) {}",
                report.path.display(),
                chunks.join(", ")
            )));
        }
        for path in &summary.skipped {
            lines.push(self.list_item(&format!("{} (not started)", path.display())));
        }

        lines.join("\n")
    }

    /// Render the dry-run plan, one line per file.
    pub fn plan(&self, planned: &[PlannedFile]) -> String {
        let mut lines = vec![self.header(&format!("{} file(s) would be processed", planned.len()))];
        let mut requests = 0;

        for file in planned {
            match &file.error {
                Some(error) => {
                    lines.push(self.error(&format!("{}: {}", file.path.display(), error)));
                }
                None => {
                    requests += file.requests;
                    let target = file
                        .artifact
                        .as_ref()
                        .map(|p| format!(" -> {}", p.display()))
                        .unwrap_or_default();
                    lines.push(self.list_item(&format!(
                        "{} [{}] {} chunk(s), {} request(s){}",
                        file.path.display(),
                        file.language_hint,
                        file.chunks,
                        file.requests,
                        target
                    )));
                }
            }
        }

        lines.push(self.info(&format!("{} request(s) in total", requests)));
        lines.join("\n")
    }
}

pub fn print_success(msg: &str) {
    if VerbosityLevel::Normal.should_output() {
        println!("{}", OutputStyle::default().success(msg));
    }
}

pub fn print_error(msg: &str) {
    let style = OutputStyle {
        use_colors: atty::is(atty::Stream::Stderr),
    };
    eprintln!("{}", style.error(msg));
}

pub fn print_warning(msg: &str) {
    if VerbosityLevel::Normal.should_output() {
        println!("{}", OutputStyle::default().warning(msg));
    }
}

pub fn print_info(msg: &str) {
    if VerbosityLevel::Normal.should_output() {
        println!("{}", OutputStyle::default().info(msg));
    }
}

/// The summary is printed at every verbosity level.
pub fn print_summary(summary: &RunSummary) {
    println!("{}", OutputStyle::default().run_summary(summary));
}
