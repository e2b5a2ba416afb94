//! Test utilities for repointel-indexer

use std::path::Path;

use tempfile::TempDir;

/// Write `(relative path, content)` pairs into a fresh temporary directory.
pub fn write_corpus(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (path, content) in files {
        write_file(dir.path(), path, content);
    }
    dir
}

pub fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(full, content).expect("write test file");
}

/// A fenced block of `lines` numbered statements.
pub fn fence(language: &str, lines: usize) -> String {
    let body: Vec<String> = (1..=lines).map(|i| format!("step_{i} = run(step_{i})")).collect();
    format!("```{}\n{}\n```\n", language, body.join("\n"))
}
