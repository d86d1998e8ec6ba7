//! Tests for loading source units and language detection

use std::{fs, path::Path};

use codenote_chunking::{ChunkingError, LanguageDetector, LanguageKind, SourceUnit};
use tempfile::TempDir;

#[tokio::test]
async fn test_load_reads_content_and_language() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.cpp");
    fs::write(&path, "int main() {}\n").unwrap();

    let unit = SourceUnit::load(&path).await.unwrap();

    assert_eq!(unit.content, "int main() {}\n");
    assert_eq!(unit.extension, "cpp");
    assert_eq!(unit.language, Some(LanguageKind::Cpp));
    assert_eq!(unit.language_hint, "C++");
}

#[tokio::test]
async fn test_load_rejects_binary_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blob.py");
    fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let result = SourceUnit::load(&path).await;

    assert!(matches!(result, Err(ChunkingError::Decode { .. })));
}

#[tokio::test]
async fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = SourceUnit::load(&dir.path().join("gone.py")).await;

    assert!(matches!(result, Err(ChunkingError::Read { .. })));
}

#[test]
fn test_unknown_extension_hint_is_uppercased() {
    let unit = SourceUnit::from_content(Path::new("Main.kt"), "fun main() {}\n".to_string());

    assert_eq!(unit.language, None);
    assert_eq!(unit.language_hint, "KT");
}

#[test]
fn test_shebang_detection() {
    let detector = LanguageDetector;

    assert_eq!(
        detector.detect(Path::new("tool"), "#!/usr/bin/env python3\nprint(1)\n"),
        Some(LanguageKind::Python)
    );
    assert_eq!(
        detector.detect(Path::new("run"), "#!/bin/bash\necho hi\n"),
        Some(LanguageKind::Shell)
    );
    assert_eq!(detector.hint(Path::new("README"), "hello\n"), "source");
}

#[test]
fn test_extension_lookup_is_case_insensitive() {
    assert_eq!(LanguageKind::from_extension(".PY"), Some(LanguageKind::Python));
    assert_eq!(LanguageKind::from_extension("rb"), Some(LanguageKind::Ruby));
    assert_eq!(LanguageKind::from_extension("kt"), None);
}
