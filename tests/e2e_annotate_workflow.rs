//! End-to-End Test Suite: annotate and explain runs against a mocked Ollama server
//!
//! These tests drive the same path as the `codenote` binary: availability
//! gate, discovery, the file pipeline, and artifact or report output.

use std::{fs, path::Path, sync::Arc};

use codenote_cli::{commands::run_outcome, context::RunContext, error::CliError};
use codenote_pipeline::{
    CodenoteConfig, ExplanationReport, FilePipeline, FileStage, FileState, OutputMarker,
    OutputNaming,
};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use tempfile::TempDir;

const MODEL: &str = "deepseek-coder-v2:16b";

fn config_for(server: &ServerGuard) -> CodenoteConfig {
    CodenoteConfig {
        base_url: server.url(),
        model: MODEL.to_string(),
        output_marker: OutputMarker::Literal("e2e".to_string()),
        ..CodenoteConfig::default()
    }
}

async fn mock_tags(server: &mut ServerGuard, models: &[&str]) -> Mock {
    let models: Vec<_> = models.iter().map(|name| json!({ "name": name })).collect();
    server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "models": models }).to_string())
        .expect_at_least(1)
        .create_async()
        .await
}

async fn mock_generate(server: &mut ServerGuard, contains: &str, response: &str) -> Mock {
    server
        .mock("POST", "/api/generate")
        .match_body(Matcher::Regex(regex_escape(contains)))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "response": response, "done": true }).to_string())
        .create_async()
        .await
}

fn regex_escape(text: &str) -> String {
    text.chars()
        .flat_map(|c| {
            if c.is_ascii_alphanumeric() || c == ' ' || c == '_' {
                vec![c]
            } else {
                vec!['\\', c]
            }
        })
        .collect()
}

fn entries_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_missing_model_stops_before_any_file_io() {
    let mut server = mockito::Server::new_async().await;
    let _tags = mock_tags(&mut server, &["llama3:latest"]).await;
    let generate = server
        .mock("POST", "/api/generate")
        .expect(0)
        .create_async()
        .await;

    let project = TempDir::new().unwrap();
    fs::write(project.path().join("main.py"), "print('hi')\n").unwrap();
    let before = entries_in(project.path());

    let result = RunContext::prepare(config_for(&server), project.path()).await;

    match result {
        Err(CliError::ModelNotFound { model, available }) => {
            assert_eq!(model, MODEL);
            assert_eq!(available, vec!["llama3:latest".to_string()]);
        }
        Err(other) => panic!("expected ModelNotFound, got {:?}", other),
        Ok(_) => panic!("gate should have failed"),
    }
    assert_eq!(entries_in(project.path()), before);
    generate.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_service_is_fatal() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("main.py"), "x = 1\n").unwrap();
    let config = CodenoteConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        ..CodenoteConfig::default()
    };

    let result = RunContext::prepare(config, project.path()).await;

    assert!(matches!(result, Err(CliError::ServiceUnavailable { .. })));
    assert_eq!(entries_in(project.path()), vec!["main.py".to_string()]);
}

#[tokio::test]
async fn test_untagged_model_resolves_to_latest() {
    let mut server = mockito::Server::new_async().await;
    let _tags = mock_tags(&mut server, &["codellama:latest"]).await;
    let project = TempDir::new().unwrap();

    let config = CodenoteConfig {
        model: "codellama".to_string(),
        ..config_for(&server)
    };
    let (ctx, entries) = RunContext::prepare(config, project.path()).await.unwrap();

    assert_eq!(ctx.model, "codellama:latest");
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_annotate_run_isolates_bad_file() {
    let mut server = mockito::Server::new_async().await;
    let _tags = mock_tags(&mut server, &[MODEL]).await;
    let _alpha = mock_generate(&mut server, "alpha = 1", "# first value\nalpha = 1\n").await;
    let _gamma = mock_generate(&mut server, "gamma = 3", "```python\n# third value\ngamma = 3\n```").await;

    let project = TempDir::new().unwrap();
    let pkg = project.path().join("pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(project.path().join("a.py"), "alpha = 1\n").unwrap();
    fs::write(project.path().join("b.py"), [0xc3u8, 0x28, b'\n']).unwrap();
    fs::write(pkg.join("c.py"), "gamma = 3\n").unwrap();
    fs::write(project.path().join("notes.txt"), "not code\n").unwrap();

    let (ctx, entries) = RunContext::prepare(config_for(&server), project.path())
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);

    let naming = OutputNaming::new(&ctx.config.output_marker, &ctx.root, None);
    let pipeline =
        FilePipeline::annotate(ctx.client.clone(), ctx.model.clone(), &ctx.config, naming).unwrap();
    let summary = pipeline.run(&entries).await;

    assert_eq!(summary.reports.len(), 3);
    assert!(matches!(
        summary.reports[1].state,
        FileState::Failed {
            stage: FileStage::Read,
            ..
        }
    ));
    assert_eq!(
        fs::read_to_string(ctx.root.join("a_commented_e2e.py")).unwrap(),
        "# first value\nalpha = 1\n"
    );
    assert_eq!(
        fs::read_to_string(ctx.root.join("pkg/c_commented_e2e.py")).unwrap(),
        "# third value\ngamma = 3\n"
    );
    assert!(!ctx.root.join("b_commented_e2e.py").exists());
    assert_eq!(fs::read_to_string(ctx.root.join("a.py")).unwrap(), "alpha = 1\n");

    assert!(run_outcome(&summary, false).is_ok());
    assert!(matches!(
        run_outcome(&summary, true),
        Err(CliError::FilesFailed { failed: 1 })
    ));
}

#[tokio::test]
async fn test_server_error_falls_back_to_original_chunk() {
    let mut server = mockito::Server::new_async().await;
    let _tags = mock_tags(&mut server, &[MODEL]).await;
    let _ok = mock_generate(&mut server, "keep = 1", "# kept\nkeep = 1\n").await;
    let _fail = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::Regex("broken".to_string()))
        .with_status(500)
        .with_body("model crashed")
        .create_async()
        .await;

    let project = TempDir::new().unwrap();
    let source = "keep = 1\nbroken = 2\n";
    fs::write(project.path().join("m.py"), source).unwrap();

    let config = CodenoteConfig {
        max_chunk_size: 10,
        ..config_for(&server)
    };
    let (ctx, entries) = RunContext::prepare(config, project.path()).await.unwrap();
    let naming = OutputNaming::new(&ctx.config.output_marker, &ctx.root, None);
    let pipeline =
        FilePipeline::annotate(ctx.client.clone(), ctx.model.clone(), &ctx.config, naming).unwrap();
    let summary = pipeline.run(&entries).await;

    let report = &summary.reports[0];
    assert_eq!(report.chunks, 2);
    assert_eq!(report.fallback_chunks, vec![2]);
    assert_eq!(
        fs::read_to_string(ctx.root.join("m_commented_e2e.py")).unwrap(),
        "# kept\nkeep = 1\nbroken = 2\n"
    );
}

#[tokio::test]
async fn test_output_dir_mirrors_tree() {
    let mut server = mockito::Server::new_async().await;
    let _tags = mock_tags(&mut server, &[MODEL]).await;
    let _gen = mock_generate(&mut server, "deep", "// deep\nint deep;\n").await;

    let workspace = TempDir::new().unwrap();
    let root = workspace.path().join("src");
    fs::create_dir_all(root.join("lib")).unwrap();
    fs::write(root.join("lib/deep.c"), "int deep;\n").unwrap();
    let out = workspace.path().join("annotated");

    let config = CodenoteConfig {
        output_dir: Some(out.clone()),
        ..config_for(&server)
    };
    let (ctx, entries) = RunContext::prepare(config, &root).await.unwrap();
    let naming = OutputNaming::new(&ctx.config.output_marker, &ctx.root, ctx.config.output_dir.clone());
    let pipeline =
        FilePipeline::annotate(ctx.client.clone(), ctx.model.clone(), &ctx.config, naming).unwrap();
    pipeline.run(&entries).await;

    let canonical_out = out.join("lib/deep_commented_e2e.c");
    assert_eq!(
        fs::read_to_string(canonical_out).unwrap(),
        "// deep\nint deep;\n"
    );
    assert_eq!(entries_in(&root.join("lib")), vec!["deep.c".to_string()]);
}

#[tokio::test]
async fn test_explain_run_writes_markdown_report() {
    let mut server = mockito::Server::new_async().await;
    let _tags = mock_tags(&mut server, &[MODEL]).await;
    let _gen = mock_generate(&mut server, "def greet", "Defines a greeting helper.").await;

    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join("greet.py"),
        "def greet():\n    return 'hi'\n",
    )
    .unwrap();

    let (ctx, entries) = RunContext::prepare(config_for(&server), project.path())
        .await
        .unwrap();
    let pipeline = FilePipeline::explain(ctx.client.clone(), ctx.model.clone(), &ctx.config).unwrap();
    let summary = pipeline.run(&entries).await;

    let report_path = project.path().join("code_explanations.md");
    ExplanationReport::from_summary(&ctx.root, &summary)
        .write(&report_path)
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(report_path).unwrap(),
        "# Code Explanations\n\n## greet.py\nDefines a greeting helper.\n\n"
    );
    assert!(!project.path().join("greet_commented_e2e.py").exists());
}

#[tokio::test]
async fn test_shared_client_is_reused_across_files() {
    let mut server = mockito::Server::new_async().await;
    let _tags = mock_tags(&mut server, &[MODEL]).await;
    let generate = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "response": "# ok\nx\n" }).to_string())
        .expect(4)
        .create_async()
        .await;

    let project = TempDir::new().unwrap();
    for i in 0..4 {
        fs::write(project.path().join(format!("f{}.js", i)), "x\n").unwrap();
    }

    let config = CodenoteConfig {
        jobs: 2,
        ..config_for(&server)
    };
    let (ctx, entries) = RunContext::prepare(config, project.path()).await.unwrap();
    let client = Arc::clone(&ctx.client);
    let naming = OutputNaming::new(&ctx.config.output_marker, &ctx.root, None);
    let pipeline = FilePipeline::annotate(client, ctx.model.clone(), &ctx.config, naming).unwrap();
    let summary = pipeline.run(&entries).await;

    assert!(!summary.has_failures());
    generate.assert_async().await;
}
