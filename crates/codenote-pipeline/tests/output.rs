//! Artifact naming and atomic write tests

use std::{fs, path::Path};

use codenote_pipeline::{ArtifactWriter, OutputMarker, OutputNaming, PipelineError};
use tempfile::TempDir;

#[test]
fn test_artifact_name_next_to_source() {
    let dir = TempDir::new().unwrap();
    let naming = OutputNaming::with_resolved_marker("20240101-120000", dir.path(), None);

    let artifact = naming.artifact_path(&dir.path().join("pkg").join("main.py"));

    assert_eq!(
        artifact,
        dir.path().join("pkg").join("main_commented_20240101-120000.py")
    );
}

#[test]
fn test_artifact_name_without_extension() {
    let naming = OutputNaming::with_resolved_marker("x", Path::new("/src"), None);

    assert_eq!(
        naming.artifact_path(Path::new("/src/Makefile")),
        Path::new("/src/Makefile_commented_x")
    );
}

#[test]
fn test_artifact_mirrors_tree_under_output_dir() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("project");
    let out = dir.path().join("out");
    fs::create_dir_all(root.join("a/b")).unwrap();
    let naming = OutputNaming::with_resolved_marker("m", &root, Some(out.clone()));

    let artifact = naming.artifact_path(&root.join("a/b/lib.js"));

    assert_eq!(artifact, out.join("a/b/lib_commented_m.js"));
}

#[test]
fn test_single_file_root_uses_parent_as_base() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("solo.c");
    fs::write(&file, "int x;\n").unwrap();
    let out = dir.path().join("out");
    let naming = OutputNaming::with_resolved_marker("m", &file, Some(out.clone()));

    assert_eq!(naming.artifact_path(&file), out.join("solo_commented_m.c"));
}

#[test]
fn test_timestamp_marker_shape() {
    let naming = OutputNaming::new(&OutputMarker::Timestamp, Path::new("."), None);
    let marker = naming.marker();

    assert_eq!(marker.len(), 15);
    assert_eq!(&marker[8..9], "-");
    assert!(marker
        .chars()
        .enumerate()
        .all(|(i, c)| i == 8 || c.is_ascii_digit()));
}

#[test]
fn test_literal_marker_used_verbatim() {
    let naming = OutputNaming::new(
        &OutputMarker::Literal("draft".to_string()),
        Path::new("/r"),
        None,
    );
    assert_eq!(
        naming.artifact_path(Path::new("/r/x.java")),
        Path::new("/r/x_commented_draft.java")
    );
}

#[tokio::test]
async fn test_writer_creates_parent_dirs_and_leaves_no_temp() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("deep/nested/out.py");

    ArtifactWriter::new().write(&target, "print(1)\n").await.unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), "print(1)\n");
    let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_writer_replaces_existing_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out.py");
    fs::write(&target, "old").unwrap();

    ArtifactWriter::new().write(&target, "new").await.unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), "new");
}

#[tokio::test]
async fn test_writer_reports_write_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let err = ArtifactWriter::new()
        .write(&blocker.join("out.py"), "x")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Write { .. }));
}
