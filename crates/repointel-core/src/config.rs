//! Engine configuration
//!
//! Every threshold lives here and is handed to each analyzer when it is
//! constructed. [`EngineConfig::validate`] must pass before any analysis runs.

use globset::Glob;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub scan: ScanConfig,
    pub manifest: ManifestConfig,
    pub redundancy: RedundancyConfig,
    pub impact: ImpactConfig,
    pub capabilities: CapabilityConfig,
    pub complexity: ComplexityConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        self.redundancy.validate()?;
        self.impact.validate()?;
        self.capabilities.validate()?;
        self.complexity.validate()?;
        Ok(())
    }
}

/// Which files make up the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub respect_gitignore: bool,
    pub include_hidden: bool,
    pub max_file_bytes: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            include: vec!["**/*.md".to_string()],
            exclude: vec![".repometa/**".to_string()],
            respect_gitignore: true,
            include_hidden: false,
            max_file_bytes: 1024 * 1024,
        }
    }
}

impl ScanConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.include.is_empty() {
            return Err(ConfigError::Empty { field: "scan.include" });
        }
        validate_globs("scan.include", &self.include)?;
        validate_globs("scan.exclude", &self.exclude)?;
        validate_positive("scan.max_file_bytes", self.max_file_bytes)
    }
}

/// Whether a missing manifest aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ManifestPolicy {
    Required,
    #[default]
    Optional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Relative to the corpus root unless absolute.
    pub path: String,
    pub policy: ManifestPolicy,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        ManifestConfig {
            path: ".repometa/manifest.yaml".to_string(),
            policy: ManifestPolicy::Optional,
        }
    }
}

/// Granularity of comparable blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockMode {
    /// Every fenced region of a markup file is one block; prose is ignored.
    #[default]
    Fenced,
    /// Each file is a single block.
    WholeFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedundancyConfig {
    pub similarity_threshold: f64,
    pub block_mode: BlockMode,
    /// Blocks shorter than this are not compared.
    pub min_block_lines: u32,
    /// Tokens shorter than this are dropped.
    pub min_token_len: usize,
    pub strip_comments: bool,
    /// Spread the pairwise pass over the rayon pool.
    pub parallel: bool,
}

impl Default for RedundancyConfig {
    fn default() -> Self {
        RedundancyConfig {
            similarity_threshold: 0.70,
            block_mode: BlockMode::Fenced,
            min_block_lines: 3,
            min_token_len: 2,
            strip_comments: true,
            parallel: true,
        }
    }
}

impl RedundancyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_unit_range("redundancy.similarity_threshold", self.similarity_threshold)?;
        validate_positive("redundancy.min_block_lines", self.min_block_lines as u64)?;
        validate_positive("redundancy.min_token_len", self.min_token_len as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Criticality points per node in the blast radius.
    pub blast_radius_weight: u32,
    /// A SPOF needs criticality strictly above this...
    pub spof_min_criticality: u32,
    /// ...and blast radius strictly above this.
    pub spof_min_blast_radius: usize,
    /// Importance at or above which a component counts as critical.
    pub critical_importance: u8,
    pub top_components: usize,
    pub max_critical_paths: usize,
    pub min_chain_length: usize,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        ImpactConfig {
            blast_radius_weight: 5,
            spof_min_criticality: 80,
            spof_min_blast_radius: 5,
            critical_importance: 90,
            top_components: 10,
            max_critical_paths: 5,
            min_chain_length: 3,
        }
    }
}

impl ImpactConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_positive("impact.blast_radius_weight", self.blast_radius_weight as u64)?;
        validate_max("impact.spof_min_criticality", self.spof_min_criticality as f64, 100.0)?;
        validate_max("impact.critical_importance", self.critical_importance as f64, 100.0)?;
        validate_positive("impact.min_chain_length", self.min_chain_length as u64)
    }
}

/// Category and path keyword signals that attach a tag to a manifest file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TagSignals {
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
}

impl TagSignals {
    fn new(categories: &[&str], keywords: &[&str]) -> Self {
        TagSignals {
            categories: categories.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// True when the category is listed or the lowercased path holds a keyword.
    pub fn matches(&self, path: &str, category: &str) -> bool {
        if self.categories.iter().any(|c| c.eq_ignore_ascii_case(category)) {
            return true;
        }
        let path = path.to_lowercase();
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && path.contains(&k.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    pub orchestration: TagSignals,
    pub chaos: TagSignals,
    pub machine_learning: TagSignals,
    pub performance: TagSignals,
    pub data_pipeline: TagSignals,
    pub data: TagSignals,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            orchestration: TagSignals::new(
                &["orchestration"],
                &["orchestration", "journey", "coordinator"],
            ),
            chaos: TagSignals::new(&["chaos", "resilience"], &["chaos", "resilience"]),
            machine_learning: TagSignals::new(&["ai_ml", "ml"], &["model", "predict", "scoring"]),
            performance: TagSignals::new(
                &["performance", "monitoring"],
                &["performance", "monitoring"],
            ),
            data_pipeline: TagSignals::new(
                &["data_pipeline", "etl"],
                &["pipeline", "bigquery", "etl"],
            ),
            data: TagSignals::new(&["data"], &["data", "bigquery"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    pub tags: TagConfig,
    pub self_testing_confidence: f64,
    pub multi_model_confidence: f64,
    pub auto_optimization_confidence: f64,
    pub consolidation_confidence: f64,
    pub predictive_confidence: f64,
    /// A category with more files than this suggests consolidation.
    pub consolidation_min_group: usize,
    /// How many files of a group are cited as evidence.
    pub max_evidence_per_group: usize,
    /// Categories never proposed for consolidation.
    pub ignored_categories: Vec<String>,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        CapabilityConfig {
            tags: TagConfig::default(),
            self_testing_confidence: 0.85,
            multi_model_confidence: 0.78,
            auto_optimization_confidence: 0.68,
            consolidation_confidence: 0.62,
            predictive_confidence: 0.62,
            consolidation_min_group: 4,
            max_evidence_per_group: 3,
            ignored_categories: vec!["unknown".to_string()],
        }
    }
}

impl CapabilityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_unit_range("capabilities.self_testing_confidence", self.self_testing_confidence)?;
        validate_unit_range("capabilities.multi_model_confidence", self.multi_model_confidence)?;
        validate_unit_range(
            "capabilities.auto_optimization_confidence",
            self.auto_optimization_confidence,
        )?;
        validate_unit_range(
            "capabilities.consolidation_confidence",
            self.consolidation_confidence,
        )?;
        validate_unit_range("capabilities.predictive_confidence", self.predictive_confidence)?;
        validate_positive(
            "capabilities.max_evidence_per_group",
            self.max_evidence_per_group as u64,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityConfig {
    pub max_lines: u32,
    pub max_score: f64,
    pub max_functions: u32,
    /// How many files the "most complex" view lists.
    pub top_files: usize,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        ComplexityConfig {
            max_lines: 500,
            max_score: 70.0,
            max_functions: 30,
            top_files: 5,
        }
    }
}

impl ComplexityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.max_score) {
            return Err(ConfigError::OutOfRange {
                field: "complexity.max_score",
                value: self.max_score,
                min: 0.0,
                max: 100.0,
            });
        }
        Ok(())
    }
}

fn validate_unit_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}

fn validate_max(field: &'static str, value: f64, max: f64) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max,
        });
    }
    Ok(())
}

fn validate_positive(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive { field });
    }
    Ok(())
}

fn validate_globs(field: &'static str, patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob {
            field,
            pattern: pattern.clone(),
            reason: e.kind().to_string(),
        })?;
    }
    Ok(())
}
