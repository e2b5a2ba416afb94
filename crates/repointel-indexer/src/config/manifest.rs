//! Manifest YAML loading
//!
//! Entries are validated one at a time. A bad entry is skipped with a
//! diagnostic; only an unreadable or non-YAML document fails the load.

use std::collections::HashSet;
use std::path::Path;

use repointel_core::manifest::{importance_from_label, DEFAULT_IMPORTANCE, UNKNOWN_CATEGORY};
use repointel_core::{
    Diagnostic, DiagnosticKind, Manifest, ManifestConfig, ManifestEntry, ManifestError,
    ManifestPolicy,
};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RawEntry {
    path: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    importance: Option<RawImportance>,
    #[serde(default, alias = "connectsTo")]
    connects_to: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawImportance {
    Score(i64),
    Label(String),
}

/// Load the manifest named by `config`, relative to `root`.
///
/// A missing file fails under [`ManifestPolicy::Required`]; otherwise it
/// yields an empty manifest and a `MissingManifest` diagnostic.
pub fn load_manifest(
    root: &Path,
    config: &ManifestConfig,
) -> Result<(Manifest, Vec<Diagnostic>), ManifestError> {
    let path = root.join(&config.path);
    if !path.is_file() {
        return match config.policy {
            ManifestPolicy::Required => Err(ManifestError::NotFound(path)),
            ManifestPolicy::Optional => {
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::MissingManifest,
                    config.path.clone(),
                    "no manifest found, dependency and capability analysis will be empty",
                )
                .warn();
                Ok((Manifest::default(), vec![diagnostic]))
            }
        };
    }

    let text = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
        path: path.clone(),
        source,
    })?;
    let (manifest, diagnostics) = parse_manifest(&text)?;
    info!(
        "loaded {} manifest entries from {} ({} rejected)",
        manifest.entries.len(),
        path.display(),
        diagnostics.len()
    );
    Ok((manifest, diagnostics))
}

pub fn parse_manifest(text: &str) -> Result<(Manifest, Vec<Diagnostic>), ManifestError> {
    let document: Value =
        serde_yaml::from_str(text).map_err(|e| ManifestError::Syntax(e.to_string()))?;

    let mapping = match document {
        Value::Null => return Ok((Manifest::default(), Vec::new())),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ManifestError::Syntax(format!(
                "expected a mapping at the top level, found {}",
                kind_of(&other)
            )));
        }
    };

    let mut diagnostics = Vec::new();
    let mut manifest = Manifest::default();

    if let Some(categories) = mapping.get("categories") {
        manifest.categories = category_names(categories);
    }

    let items = match mapping.get("structure") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items.clone(),
        Some(other) => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::MalformedManifestEntry,
                    "structure",
                    format!("expected a list of entries, found {}", kind_of(other)),
                )
                .warn(),
            );
            Vec::new()
        }
    };

    let mut seen = HashSet::new();
    for (position, item) in items.into_iter().enumerate() {
        match validate_entry(item) {
            Ok(entry) => {
                if seen.insert(entry.path.clone()) {
                    manifest.entries.push(entry);
                } else {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::DuplicateManifestEntry,
                            entry.path,
                            "path listed more than once, keeping the first entry",
                        )
                        .warn(),
                    );
                }
            }
            Err((subject, reason)) => diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::MalformedManifestEntry,
                    subject.unwrap_or_else(|| format!("structure[{}]", position)),
                    reason,
                )
                .warn(),
            ),
        }
    }

    for category in manifest.undeclared_categories() {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::UndeclaredCategory,
                category,
                "category is used by an entry but not listed under categories",
            )
            .warn(),
        );
    }

    Ok((manifest, diagnostics))
}

fn validate_entry(item: Value) -> Result<ManifestEntry, (Option<String>, String)> {
    let declared_path = item
        .get("path")
        .and_then(Value::as_str)
        .map(str::to_string);

    let raw: RawEntry =
        serde_yaml::from_value(item).map_err(|e| (declared_path.clone(), e.to_string()))?;

    let path = raw.path.trim().to_string();
    if path.is_empty() {
        return Err((None, "entry has an empty path".to_string()));
    }

    let importance = match raw.importance {
        None => DEFAULT_IMPORTANCE,
        Some(RawImportance::Score(score)) => u8::try_from(score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or_else(|| (Some(path.clone()), format!("importance {} is outside 0-100", score)))?,
        Some(RawImportance::Label(label)) => importance_from_label(&label)
            .ok_or_else(|| (Some(path.clone()), format!("unknown importance label {:?}", label)))?,
    };

    let category = raw
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

    Ok(ManifestEntry {
        path,
        category,
        importance,
        connects_to: raw.connects_to,
        dependencies: raw.dependencies,
        description: raw.description,
    })
}

/// Top-level `categories:` as either a list of names or a mapping keyed by name.
fn category_names(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::Mapping(map) => map
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
