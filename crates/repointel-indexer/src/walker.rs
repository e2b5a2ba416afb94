//! Corpus discovery and the single shared read of every file
//!
//! Both block extraction and complexity scoring work from the [`Corpus`]
//! produced here, so each file is read from disk exactly once per run.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use repointel_core::{Diagnostic, DiagnosticKind, Language, ScanConfig, ScanError};
use tracing::{debug, info};

/// One corpus file, decoded as UTF-8.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Relative to the corpus root.
    pub path: PathBuf,
    pub language: Language,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        SourceFile {
            language: Language::from_path(&path),
            path,
            content: content.into(),
        }
    }

    pub fn line_count(&self) -> u32 {
        self.content.lines().count() as u32
    }

    /// Forward-slash path string, used as the file's identity in reports.
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

/// Every readable file of one run, sorted by path.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub root: PathBuf,
    pub files: Vec<SourceFile>,
    /// Files that matched the scan patterns but could not be used.
    pub diagnostics: Vec<Diagnostic>,
}

impl Corpus {
    /// Build a corpus from in-memory files.
    pub fn from_files(root: impl Into<PathBuf>, mut files: Vec<SourceFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Corpus {
            root: root.into(),
            files,
            diagnostics: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Walk `root` and read every file selected by `config`.
///
/// Only a missing or non-directory root is an error. Files that cannot be
/// read, are too large, or are not UTF-8 become `UnreadableFile` diagnostics.
pub fn read_corpus(root: &Path, config: &ScanConfig) -> Result<Corpus, ScanError> {
    if !root.exists() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let include = build_globset(&config.include)?;
    let exclude = build_globset(&config.exclude)?;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(!config.include_hidden)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .parents(config.respect_gitignore)
        .ignore(config.respect_gitignore)
        .require_git(false)
        .follow_links(false);

    let mut files = Vec::new();
    let mut diagnostics = Vec::new();

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::UnreadableFile,
                        root.display().to_string(),
                        err.to_string(),
                    )
                    .warn(),
                );
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        if !include.is_match(&rel) || exclude.is_match(&rel) {
            continue;
        }

        match read_file(path, &rel, config.max_file_bytes) {
            Ok(file) => files.push(file),
            Err(diagnostic) => diagnostics.push(diagnostic.warn()),
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    diagnostics.sort();

    info!(
        "read {} files from {} ({} skipped)",
        files.len(),
        root.display(),
        diagnostics.len()
    );

    Ok(Corpus {
        root: root.to_path_buf(),
        files,
        diagnostics,
    })
}

fn read_file(path: &Path, rel: &Path, max_bytes: u64) -> Result<SourceFile, Diagnostic> {
    let subject = rel.to_string_lossy().replace('\\', "/");
    let unreadable =
        |message: String| Diagnostic::new(DiagnosticKind::UnreadableFile, subject.clone(), message);

    let size = std::fs::metadata(path)
        .map_err(|e| unreadable(e.to_string()))?
        .len();
    if size > max_bytes {
        return Err(unreadable(format!(
            "file is {} bytes, above the {} byte limit",
            size, max_bytes
        )));
    }

    let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    let content = String::from_utf8(bytes)
        .map_err(|_| unreadable("file is not valid UTF-8".to_string()))?;

    debug!("read {} ({} bytes)", subject, size);
    Ok(SourceFile::new(rel, content))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_corpus;

    #[test]
    fn test_missing_root_is_an_error() {
        let err =
            read_corpus(Path::new("/definitely/not/here"), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::MissingRoot(_)));
    }

    #[test]
    fn test_include_and_exclude_patterns() {
        let dir = write_corpus(&[
            ("README.md", "# Title\n"),
            ("docs/guide.md", "## Guide\n"),
            ("src/main.rs", "fn main() {}\n"),
            (".repometa/notes.md", "# internal\n"),
        ]);

        let corpus = read_corpus(dir.path(), &ScanConfig::default()).unwrap();
        let paths: Vec<String> = corpus.files.iter().map(|f| f.display_path()).collect();
        assert_eq!(paths, vec!["README.md", "docs/guide.md"]);
        assert!(corpus.diagnostics.is_empty());
    }

    #[test]
    fn test_gitignore_respected() {
        let dir = write_corpus(&[
            (".gitignore", "build/\n"),
            ("keep.md", "kept\n"),
            ("build/drop.md", "dropped\n"),
        ]);

        let corpus = read_corpus(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.files[0].path, PathBuf::from("keep.md"));
    }

    #[test]
    fn test_non_utf8_file_becomes_diagnostic() {
        let dir = write_corpus(&[("good.md", "fine\n")]);
        std::fs::write(dir.path().join("bad.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let corpus = read_corpus(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.diagnostics.len(), 1);
        assert_eq!(corpus.diagnostics[0].kind, DiagnosticKind::UnreadableFile);
        assert_eq!(corpus.diagnostics[0].subject, "bad.md");
    }

    #[test]
    fn test_oversized_file_skipped() {
        let dir = write_corpus(&[("big.md", "0123456789\n"), ("small.md", "ok\n")]);
        let config = ScanConfig {
            max_file_bytes: 5,
            ..ScanConfig::default()
        };

        let corpus = read_corpus(dir.path(), &config).unwrap();
        assert!(corpus.files.iter().all(|f| f.path != Path::new("big.md")));
        assert_eq!(corpus.diagnostics[0].subject, "big.md");
    }
}
