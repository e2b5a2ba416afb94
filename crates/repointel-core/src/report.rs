//! Report object handed to downstream formatters

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;
use crate::model::{ComplexityMetrics, InferredCapability, NodeImpact, RedundancyCluster};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RedundancyReport {
    pub blocks_analyzed: usize,
    /// Pairwise similarity evaluations performed by the approximate pass.
    pub comparisons: u64,
    pub total_clusters: usize,
    pub total_duplicate_blocks: usize,
    pub total_potential_savings: u32,
    pub clusters: Vec<RedundancyCluster>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePointOfFailure {
    pub component: String,
    pub reason: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRisk {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    pub chain: Vec<String>,
    pub length: usize,
    pub risk: PathRisk,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Every component, ranked by criticality descending then id.
    pub components: Vec<NodeImpact>,
    /// Ids of the highest ranked components.
    pub top_components: Vec<String>,
    pub single_points_of_failure: Vec<SinglePointOfFailure>,
    pub cycles: Vec<Vec<String>>,
    pub critical_paths: Vec<CriticalPath>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexitySummary {
    pub files_analyzed: usize,
    pub average_score: f64,
    pub files_needing_refactoring: usize,
    pub refactoring_percentage: f64,
    pub total_lines: u64,
    pub most_complex: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexityReport {
    /// Sorted by score descending, then path.
    pub files: Vec<ComplexityMetrics>,
    pub summary: ComplexitySummary,
}

impl ComplexityReport {
    pub fn needing_refactoring(&self) -> impl Iterator<Item = &ComplexityMetrics> {
        self.files.iter().filter(|m| m.needs_refactoring)
    }
}

/// Everything one engine run produced. Sections that were not requested
/// stay `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy: Option<RedundancyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<InferredCapability>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain `key: value` lines, one finding per line, for grep-friendly output.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if let Some(redundancy) = &self.redundancy {
            let _ = writeln!(
                out,
                "redundancy: {} clusters, {} duplicate blocks, {} lines removable ({} blocks, {} comparisons)",
                redundancy.total_clusters,
                redundancy.total_duplicate_blocks,
                redundancy.total_potential_savings,
                redundancy.blocks_analyzed,
                redundancy.comparisons,
            );
            for cluster in &redundancy.clusters {
                let _ = writeln!(
                    out,
                    "cluster {}: {} blocks, similarity {:.2}, savings {} lines",
                    cluster.cluster_id,
                    cluster.len(),
                    cluster.similarity_score,
                    cluster.potential_savings_lines,
                );
                for member in &cluster.members {
                    let _ = writeln!(
                        out,
                        "  at {}:{} ({} lines)",
                        member.source_file.display(),
                        member.line_range,
                        member.line_count,
                    );
                }
                let _ = writeln!(out, "  hint: {}", cluster.recommendation);
            }
        }

        if let Some(impact) = &self.impact {
            let _ = writeln!(
                out,
                "impact: {} components, {} single points of failure, {} cycles",
                impact.components.len(),
                impact.single_points_of_failure.len(),
                impact.cycles.len(),
            );
            for spof in &impact.single_points_of_failure {
                let _ = writeln!(
                    out,
                    "spof {}: {} | {}",
                    spof.component, spof.reason, spof.mitigation
                );
            }
            for id in &impact.top_components {
                if let Some(c) = impact.components.iter().find(|c| &c.id == id) {
                    let _ = writeln!(
                        out,
                        "component {}: criticality {}, blast radius {}, severity {}",
                        c.id, c.criticality_score, c.blast_radius, c.severity,
                    );
                }
            }
            for cycle in &impact.cycles {
                let _ = writeln!(out, "cycle: {}", cycle.join(" <-> "));
            }
            for path in &impact.critical_paths {
                let _ = writeln!(out, "path ({:?}): {}", path.risk, path.chain.join(" -> "));
            }
        }

        if let Some(capabilities) = &self.capabilities {
            let _ = writeln!(out, "capabilities: {}", capabilities.len());
            for cap in capabilities {
                let _ = writeln!(
                    out,
                    "capability {}: confidence {:.2}, effort {}, enabled by {}",
                    cap.name,
                    cap.confidence,
                    cap.implementation_effort,
                    cap.enabled_by().join(", "),
                );
            }
        }

        if let Some(complexity) = &self.complexity {
            let summary = &complexity.summary;
            let _ = writeln!(
                out,
                "complexity: {} files, average {:.1}, {} flagged ({:.1}%), {} lines",
                summary.files_analyzed,
                summary.average_score,
                summary.files_needing_refactoring,
                summary.refactoring_percentage,
                summary.total_lines,
            );
            for metric in complexity.needing_refactoring() {
                let _ = writeln!(
                    out,
                    "refactor {}: score {:.1}, {} lines, {} functions, {} sections",
                    metric.file.display(),
                    metric.score,
                    metric.line_count,
                    metric.function_count,
                    metric.section_count,
                );
            }
        }

        for diagnostic in &self.diagnostics {
            let _ = writeln!(out, "warning: {}", diagnostic);
        }

        out
    }
}
