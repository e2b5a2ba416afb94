//! Core data structures for blocks, dependency components, capabilities and metrics

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stable identifier for an extracted block: `<source file>:<start line>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub String);

impl BlockId {
    pub fn new(source_file: &Path, start_line: u32) -> Self {
        BlockId(format!("{}:{}", source_file.display(), start_line))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive, 1-indexed line span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        LineRange { start, end: end.max(start) }
    }

    /// Number of lines covered by the range.
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Hex digest of a block's raw text, used for exact-match grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn of(text: &str) -> Self {
        ContentHash(blake3::hash(text.as_bytes()).to_hex().to_string())
    }
}

/// Order-insensitive token multiset.
///
/// Similarity is computed over the distinct tokens, so two bags holding the
/// same words in any order and with any repetition compare as identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBag {
    counts: BTreeMap<String, u32>,
}

impl TokenBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>) {
        *self.counts.entry(token.into()).or_insert(0) += 1;
    }

    /// Number of distinct tokens.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total number of tokens including repeats.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, token: &str) -> u32 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Jaccard index `|A ∩ B| / |A ∪ B|` over the distinct tokens.
    ///
    /// Two empty bags are identical (1.0); an empty bag shares nothing with a
    /// non-empty one (0.0).
    pub fn jaccard(&self, other: &TokenBag) -> f64 {
        if self.is_empty() && other.is_empty() {
            return 1.0;
        }
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }

        let (small, large) = if self.distinct() <= other.distinct() {
            (self, other)
        } else {
            (other, self)
        };
        let intersection = small
            .counts
            .keys()
            .filter(|token| large.counts.contains_key(*token))
            .count();
        let union = self.distinct() + other.distinct() - intersection;

        intersection as f64 / union as f64
    }
}

impl<S: Into<String>> FromIterator<S> for TokenBag {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut bag = TokenBag::new();
        for token in iter {
            bag.insert(token);
        }
        bag
    }
}

/// A comparable unit of text extracted from one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub id: BlockId,
    pub source_file: PathBuf,
    pub line_range: LineRange,
    /// Info string of the fence (```` ```python ````), if any.
    pub fence_language: Option<String>,
    pub raw_text: String,
    pub content_hash: ContentHash,
    #[serde(skip)]
    pub tokens: TokenBag,
}

impl CodeBlock {
    pub fn line_count(&self) -> u32 {
        self.line_range.len()
    }

    pub fn similarity_to(&self, other: &CodeBlock) -> f64 {
        if self.content_hash == other.content_hash {
            return 1.0;
        }
        self.tokens.jaccard(&other.tokens)
    }
}

/// How the members of a cluster were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Identical content hashes.
    Exact,
    /// Connected through token-set similarity at or above the threshold.
    Approximate,
}

/// Lightweight reference to a clustered block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub block_id: BlockId,
    pub source_file: PathBuf,
    pub line_range: LineRange,
    pub line_count: u32,
}

impl From<&CodeBlock> for ClusterMember {
    fn from(block: &CodeBlock) -> Self {
        ClusterMember {
            block_id: block.id.clone(),
            source_file: block.source_file.clone(),
            line_range: block.line_range,
            line_count: block.line_count(),
        }
    }
}

/// A group of two or more duplicated or near-duplicated blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedundancyCluster {
    /// 1-based position in the report.
    pub cluster_id: usize,
    pub match_kind: MatchKind,
    /// Discovery order; the first member is the representative.
    pub members: Vec<ClusterMember>,
    /// Minimum similarity over the pairs that joined the cluster.
    pub similarity_score: f64,
    pub potential_savings_lines: u32,
    pub recommendation: String,
}

impl RedundancyCluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Distinct files the cluster spans, in sorted order.
    pub fn files(&self) -> BTreeSet<&Path> {
        self.members.iter().map(|m| m.source_file.as_path()).collect()
    }
}

/// A component declared in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub id: String,
    /// 0–100, supplied by the manifest.
    pub importance: u8,
    pub category: String,
    /// Ids this component declares it connects to.
    pub forward_edges: BTreeSet<String>,
    /// Third-party systems this component relies on.
    pub external_dependencies: Vec<String>,
}

impl DependencyNode {
    pub fn new(id: impl Into<String>, importance: u8) -> Self {
        DependencyNode {
            id: id.into(),
            importance,
            category: String::from("unknown"),
            forward_edges: BTreeSet::new(),
            external_dependencies: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn connects_to(mut self, target: impl Into<String>) -> Self {
        self.forward_edges.insert(target.into());
        self
    }
}

/// What happens downstream when a component fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureSeverity {
    Low,
    Moderate,
    Severe,
    Catastrophic,
}

impl fmt::Display for FailureSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureSeverity::Low => "low",
            FailureSeverity::Moderate => "moderate",
            FailureSeverity::Severe => "severe",
            FailureSeverity::Catastrophic => "catastrophic",
        };
        f.write_str(label)
    }
}

/// Derived impact figures for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeImpact {
    pub id: String,
    pub importance: u8,
    pub category: String,
    /// Components that declare a connection to this one, sorted.
    pub reverse_edges: Vec<String>,
    /// Distinct components transitively depending on this one.
    pub blast_radius: usize,
    /// 0–100.
    pub criticality_score: u32,
    pub is_single_point_of_failure: bool,
    pub severity: FailureSeverity,
    pub external_dependencies: Vec<String>,
    pub mitigations: Vec<String>,
}

/// Rough cost of acting on a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Effort::Low => "low",
            Effort::Medium => "medium",
            Effort::High => "high",
        };
        f.write_str(label)
    }
}

/// A file cited by an inference rule and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub file: String,
    pub reason: String,
}

impl Evidence {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Evidence {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// A capability suggested by a heuristic rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredCapability {
    /// Identifier of the rule that produced this record.
    pub rule: String,
    pub name: String,
    pub description: String,
    pub evidence: Vec<Evidence>,
    /// 0.0–1.0.
    pub confidence: f64,
    pub implementation_effort: Effort,
    pub potential_value: String,
}

impl InferredCapability {
    /// Files cited as evidence, without repeats, in citation order.
    pub fn enabled_by(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.evidence
            .iter()
            .map(|e| e.file.as_str())
            .filter(|file| seen.insert(*file))
            .collect()
    }
}

/// Why a file was flagged for refactoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefactorReason {
    LargeFile,
    ManyFunctions,
    HighScore,
}

/// Structural metrics for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub file: PathBuf,
    pub line_count: u32,
    pub function_count: u32,
    pub section_count: u32,
    pub import_count: u32,
    /// 0–100.
    pub score: f64,
    pub needs_refactoring: bool,
    pub reasons: Vec<RefactorReason>,
}

/// Languages the marker heuristics distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Rust,
    TypeScript,
    JavaScript,
    Python,
    Go,
    Java,
    C,
    Cpp,
    Yaml,
    Toml,
    Json,
    Sql,
    Markdown,
    Other,
}

impl Language {
    /// Detect language from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("rs") => Language::Rust,
            Some("ts") | Some("tsx") => Language::TypeScript,
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => Language::JavaScript,
            Some("py") | Some("pyi") => Language::Python,
            Some("go") => Language::Go,
            Some("java") => Language::Java,
            Some("c") | Some("h") => Language::C,
            Some("cpp") | Some("cc") | Some("cxx") | Some("hpp") | Some("hh") => Language::Cpp,
            Some("yml") | Some("yaml") => Language::Yaml,
            Some("toml") => Language::Toml,
            Some("json") | Some("jsonc") => Language::Json,
            Some("sql") => Language::Sql,
            Some("md") | Some("mdx") | Some("markdown") => Language::Markdown,
            _ => Language::Other,
        }
    }

    /// Prose formats where headings mark sections and code lives in fences.
    pub fn is_markup(&self) -> bool {
        matches!(self, Language::Markdown)
    }

    /// Formats with no function or import concept.
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            Language::Yaml | Language::Toml | Language::Json | Language::Sql
        )
    }
}
