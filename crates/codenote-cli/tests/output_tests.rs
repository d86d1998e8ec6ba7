//! Output formatting tests

use std::path::{Path, PathBuf};

use codenote_cli::{
    commands::run_outcome,
    error::CliError,
    output::OutputStyle,
};
use codenote_pipeline::{FileReport, FileStage, FileState, PlannedFile, RunSummary};

fn plain() -> OutputStyle {
    OutputStyle { use_colors: false }
}

fn written(path: &str) -> FileReport {
    let mut report = FileReport::new(Path::new(path));
    report.state = FileState::Written {
        artifact: PathBuf::from(format!("{}.out", path)),
    };
    report
}

fn sample_summary() -> RunSummary {
    let mut partial = written("b.py");
    partial.fallback_chunks = vec![2, 5];

    RunSummary {
        reports: vec![
            written("a.py"),
            partial,
            FileReport::new(Path::new("c.py")).fail(FileStage::Read, "invalid UTF-8"),
        ],
        skipped: vec![PathBuf::from("d.py")],
        cancelled: false,
    }
}

#[test]
fn test_output_style_without_colors() {
    let style = plain();
    assert_eq!(style.success("test"), "✓ test");
    assert_eq!(style.error("test"), "✗ test");
    assert_eq!(style.warning("test"), "⚠ test");
    assert_eq!(style.info("test"), "ℹ test");
}

#[test]
fn test_run_summary_counts_and_details() {
    let text = plain().run_summary(&sample_summary());

    assert!(text.contains("completed: 2"));
    assert!(text.contains("partially annotated: 1"));
    assert!(text.contains("failed: 1"));
    assert!(text.contains("skipped: 1"));
    assert!(text.contains("✗ c.py (read): invalid UTF-8"));
    assert!(text.contains("b.py: original text kept for chunk(s) 2, 5"));
    assert!(text.contains("d.py (not started)"));
}

#[test]
fn test_plan_lists_files_and_total_requests() {
    let planned = vec![
        PlannedFile {
            path: PathBuf::from("a.py"),
            language_hint: "Python".to_string(),
            chunks: 3,
            requests: 3,
            artifact: Some(PathBuf::from("a_commented_x.py")),
            error: None,
        },
        PlannedFile {
            path: PathBuf::from("bad.py"),
            language_hint: String::new(),
            chunks: 0,
            requests: 0,
            artifact: None,
            error: Some("not valid UTF-8".to_string()),
        },
    ];

    let text = plain().plan(&planned);

    assert!(text.contains("2 file(s) would be processed"));
    assert!(text.contains("a.py [Python] 3 chunk(s), 3 request(s) -> a_commented_x.py"));
    assert!(text.contains("✗ bad.py: not valid UTF-8"));
    assert!(text.contains("3 request(s) in total"));
}

#[test]
fn test_failures_do_not_change_exit_without_strict() {
    let summary = sample_summary();

    assert!(run_outcome(&summary, false).is_ok());
    assert!(matches!(
        run_outcome(&summary, true),
        Err(CliError::FilesFailed { failed: 1 })
    ));
}

#[test]
fn test_cancelled_run_is_error() {
    let summary = RunSummary {
        cancelled: true,
        ..RunSummary::default()
    };

    assert!(matches!(run_outcome(&summary, false), Err(CliError::Cancelled)));
}
