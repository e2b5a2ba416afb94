//! Typed view of the externally supplied manifest

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::DependencyNode;

/// Importance assumed when an entry does not state one.
pub const DEFAULT_IMPORTANCE: u8 = 50;

/// Category assumed when an entry does not state one.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Map a textual importance label onto the 0–100 scale.
pub fn importance_from_label(label: &str) -> Option<u8> {
    match label.trim().to_ascii_lowercase().as_str() {
        "critical" => Some(100),
        "high" => Some(75),
        "medium" => Some(50),
        "low" => Some(25),
        _ => None,
    }
}

/// One validated `structure:` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub category: String,
    pub importance: u8,
    pub connects_to: Vec<String>,
    pub dependencies: Vec<String>,
    pub description: Option<String>,
}

impl ManifestEntry {
    pub fn new(path: impl Into<String>) -> Self {
        ManifestEntry {
            path: path.into(),
            category: UNKNOWN_CATEGORY.to_string(),
            importance: DEFAULT_IMPORTANCE,
            connects_to: Vec::new(),
            dependencies: Vec::new(),
            description: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance.min(100);
        self
    }

    pub fn connects_to(mut self, target: impl Into<String>) -> Self {
        self.connects_to.push(target.into());
        self
    }

    pub fn to_node(&self) -> DependencyNode {
        DependencyNode {
            id: self.path.clone(),
            importance: self.importance,
            category: self.category.clone(),
            forward_edges: self.connects_to.iter().cloned().collect(),
            external_dependencies: self.dependencies.clone(),
        }
    }
}

/// Manifest entries in declaration order, unique by path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    /// Category names declared at the top level, if any.
    pub categories: Vec<String>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Manifest {
            entries,
            categories: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn dependency_nodes(&self) -> Vec<DependencyNode> {
        self.entries.iter().map(ManifestEntry::to_node).collect()
    }

    /// True when either entry declares a connection to the other.
    pub fn connected(&self, a: &str, b: &str) -> bool {
        let declares = |from: &str, to: &str| {
            self.entry(from)
                .is_some_and(|e| e.connects_to.iter().any(|t| t == to))
        };
        declares(a, b) || declares(b, a)
    }

    /// Every category used by an entry, sorted.
    pub fn used_categories(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.category.as_str()).collect()
    }

    /// Categories used by an entry but absent from a declared `categories`
    /// list. Nothing is undeclared when the list is empty.
    pub fn undeclared_categories(&self) -> Vec<&str> {
        if self.categories.is_empty() {
            return Vec::new();
        }
        self.used_categories()
            .into_iter()
            .filter(|c| *c != UNKNOWN_CATEGORY && !self.categories.iter().any(|d| d == c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_labels() {
        assert_eq!(importance_from_label("critical"), Some(100));
        assert_eq!(importance_from_label(" High "), Some(75));
        assert_eq!(importance_from_label("medium"), Some(50));
        assert_eq!(importance_from_label("low"), Some(25));
        assert_eq!(importance_from_label("urgent"), None);
    }

    #[test]
    fn test_connected_is_symmetric() {
        let manifest = Manifest::new(vec![
            ManifestEntry::new("data/customers.sql").connects_to("ml/churn.py"),
            ManifestEntry::new("ml/churn.py"),
            ManifestEntry::new("ml/ltv.py"),
        ]);
        assert!(manifest.connected("data/customers.sql", "ml/churn.py"));
        assert!(manifest.connected("ml/churn.py", "data/customers.sql"));
        assert!(!manifest.connected("data/customers.sql", "ml/ltv.py"));
    }

    #[test]
    fn test_to_node_copies_edges() {
        let entry = ManifestEntry::new("a")
            .with_category("core")
            .with_importance(120)
            .connects_to("b")
            .connects_to("b");
        let node = entry.to_node();
        assert_eq!(node.importance, 100);
        assert_eq!(node.forward_edges.len(), 1);
        assert_eq!(node.category, "core");
    }
}
