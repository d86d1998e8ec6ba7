//! Error handling tests
//!
//! Tests for CLI error types, user-facing messages and exit codes.

use std::path::PathBuf;

use codenote_chunking::ChunkingError;
use codenote_cli::error::CliError;
use codenote_ollama::AnnotationError;
use codenote_pipeline::PipelineError;

#[test]
fn test_unreachable_suggests_ollama_serve() {
    let error: CliError = AnnotationError::Unreachable {
        url: "http://localhost:11434".to_string(),
        message: "connection refused".to_string(),
    }
    .into();

    let msg = error.user_message();
    assert!(msg.contains("http://localhost:11434"));
    assert!(msg.contains("ollama serve"));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn test_model_not_found_suggests_pull_and_lists_models() {
    let error: CliError = AnnotationError::ModelNotFound {
        model: "deepseek-coder-v2:16b".to_string(),
        available: vec!["llama3:latest".to_string()],
    }
    .into();

    let msg = error.user_message();
    assert!(msg.contains("ollama pull deepseek-coder-v2:16b"));
    assert!(msg.contains("llama3:latest"));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn test_config_errors_map_to_config() {
    let error: CliError = PipelineError::Config("jobs must be at least 1".to_string()).into();
    assert!(matches!(error, CliError::Config(ref m) if m == "jobs must be at least 1"));

    let error: CliError = ChunkingError::InvalidChunkSize.into();
    assert!(matches!(error, CliError::Config(_)));

    let error: CliError = AnnotationError::InvalidModelName("empty".to_string()).into();
    assert!(matches!(error, CliError::Config(_)));
}

#[test]
fn test_discovery_error_mapping() {
    let error: CliError = PipelineError::Chunking(ChunkingError::RootNotFound {
        path: PathBuf::from("/missing"),
    })
    .into();

    assert!(matches!(error, CliError::Discovery(_)));
    assert!(error.user_message().contains("/missing"));
}

#[test]
fn test_report_write_failure_is_output_error() {
    let error: CliError = PipelineError::Write {
        path: PathBuf::from("report.md"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    }
    .into();

    assert!(matches!(error, CliError::Output(_)));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn test_exit_codes() {
    assert_eq!(CliError::FilesFailed { failed: 3 }.exit_code(), 2);
    assert_eq!(CliError::Cancelled.exit_code(), 130);
    assert_eq!(CliError::Service("boom".to_string()).exit_code(), 1);
}

#[test]
fn test_files_failed_message() {
    let msg = CliError::FilesFailed { failed: 2 }.user_message();
    assert!(msg.contains("2 file(s) failed"));
    assert!(msg.contains("--strict"));
}
