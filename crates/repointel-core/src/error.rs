//! Error taxonomy
//!
//! Only structurally invalid setup is an error. Problems with individual
//! files, manifest entries or edges are reported as [`Diagnostic`]s and the
//! analysis carries on.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration, rejected before any analysis runs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },

    #[error("invalid glob pattern {pattern:?} in {field}: {reason}")]
    InvalidGlob {
        field: &'static str,
        pattern: String,
        reason: String,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("cannot parse configuration {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid value {value:?} for {key}")]
    InvalidOverride { key: &'static str, value: String },
}

/// The manifest could not be used at all.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found at {0}")]
    NotFound(PathBuf),

    #[error("cannot read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest is not a YAML mapping: {0}")]
    Syntax(String),
}

/// The corpus root cannot be walked.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("corpus root {0} does not exist")]
    MissingRoot(PathBuf),

    #[error("corpus root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] globset::Error),
}

/// Category of a non-fatal input problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnreadableFile,
    MissingManifest,
    MalformedManifestEntry,
    DuplicateManifestEntry,
    UndeclaredCategory,
    DanglingEdge,
}

/// A skipped input item, kept in the report so callers can audit coverage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// File path, manifest entry or edge the problem concerns.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Log the diagnostic as a warning and hand it back for collection.
    pub fn warn(self) -> Self {
        tracing::warn!(kind = ?self.kind, subject = %self.subject, "{}", self.message);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}: {}", self.kind, self.subject, self.message)
    }
}
