//! Repointel Core: data model, configuration, manifest types, dependency graph and report

pub mod config;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod model;
pub mod report;


#[cfg(test)]
pub mod test_utils;

pub use config::{
    BlockMode, CapabilityConfig, ComplexityConfig, EngineConfig, ImpactConfig, ManifestConfig,
    ManifestPolicy, RedundancyConfig, ScanConfig, TagConfig, TagSignals,
};
pub use error::{ConfigError, Diagnostic, DiagnosticKind, ManifestError, ScanError};
pub use graph::DependencyGraph;
pub use manifest::{Manifest, ManifestEntry};
pub use model::{
    BlockId, ClusterMember, CodeBlock, ComplexityMetrics, ContentHash, DependencyNode, Effort,
    Evidence, FailureSeverity, InferredCapability, Language, LineRange, MatchKind, NodeImpact,
    RedundancyCluster, RefactorReason, TokenBag,
};
pub use report::{
    ComplexityReport, ComplexitySummary, CriticalPath, ImpactReport, PathRisk, RedundancyReport,
    Report, SinglePointOfFailure,
};
