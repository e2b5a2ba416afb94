//! Blast radius, criticality and single-point-of-failure analysis

use repointel_core::{
    CriticalPath, DependencyGraph, DependencyNode, FailureSeverity, ImpactConfig, ImpactReport,
    NodeImpact, PathRisk, SinglePointOfFailure,
};
use tracing::{debug, info};

pub struct ImpactAnalyzer {
    config: ImpactConfig,
}

impl ImpactAnalyzer {
    pub fn new(config: ImpactConfig) -> Self {
        ImpactAnalyzer { config }
    }

    pub fn analyze(&self, graph: &DependencyGraph) -> ImpactReport {
        let mut components: Vec<NodeImpact> =
            graph.nodes().map(|node| self.assess(graph, node)).collect();
        components.sort_by(|a, b| {
            b.criticality_score
                .cmp(&a.criticality_score)
                .then_with(|| a.id.cmp(&b.id))
        });

        let single_points_of_failure: Vec<SinglePointOfFailure> = components
            .iter()
            .filter(|c| c.is_single_point_of_failure)
            .map(|c| SinglePointOfFailure {
                component: c.id.clone(),
                reason: format!(
                    "criticality {} with {} components depending on it",
                    c.criticality_score, c.blast_radius
                ),
                mitigation: c.mitigations.join(" | "),
            })
            .collect();

        let top_components = components
            .iter()
            .take(self.config.top_components)
            .map(|c| c.id.clone())
            .collect();

        let cycles = graph.cycles();
        for cycle in &cycles {
            debug!("dependency cycle: {}", cycle.join(" <-> "));
        }

        let critical_paths = self.critical_paths(graph);

        info!(
            "impact: {} components, {} single points of failure, {} cycles",
            components.len(),
            single_points_of_failure.len(),
            cycles.len()
        );

        ImpactReport {
            components,
            top_components,
            single_points_of_failure,
            cycles,
            critical_paths,
        }
    }

    /// `min(100, importance + blast_radius * weight)`
    pub fn criticality(&self, importance: u8, blast_radius: usize) -> u32 {
        let spread = (blast_radius as u64).saturating_mul(self.config.blast_radius_weight as u64);
        (importance as u64).saturating_add(spread).min(100) as u32
    }

    pub fn is_critical(&self, importance: u8) -> bool {
        importance >= self.config.critical_importance
    }

    pub fn severity(&self, critical: bool, impacted: usize) -> FailureSeverity {
        if critical && impacted >= 5 {
            FailureSeverity::Catastrophic
        } else if critical || impacted >= 10 {
            FailureSeverity::Severe
        } else if impacted >= 5 {
            FailureSeverity::Moderate
        } else {
            FailureSeverity::Low
        }
    }

    fn assess(&self, graph: &DependencyGraph, node: &DependencyNode) -> NodeImpact {
        let blast_radius = graph.blast_radius(&node.id);
        let criticality_score = self.criticality(node.importance, blast_radius);
        let critical = self.is_critical(node.importance);

        NodeImpact {
            id: node.id.clone(),
            importance: node.importance,
            category: node.category.clone(),
            reverse_edges: graph.dependents(&node.id).into_iter().map(str::to_string).collect(),
            blast_radius,
            criticality_score,
            is_single_point_of_failure: criticality_score > self.config.spof_min_criticality
                && blast_radius > self.config.spof_min_blast_radius,
            severity: self.severity(critical, blast_radius),
            external_dependencies: node.external_dependencies.clone(),
            mitigations: self.mitigations(node, blast_radius, critical),
        }
    }

    fn mitigations(
        &self,
        node: &DependencyNode,
        blast_radius: usize,
        critical: bool,
    ) -> Vec<String> {
        let mut strategies = Vec::new();
        if blast_radius >= self.config.spof_min_blast_radius {
            strategies.push("Implement circuit breaker pattern".to_string());
        }
        if !node.external_dependencies.is_empty() {
            strategies.push(format!(
                "Add caching layer in front of {}",
                node.external_dependencies.join(", ")
            ));
        }
        if critical {
            strategies.push("Set up redundancy/failover".to_string());
        }
        if strategies.is_empty() {
            strategies.push("Monitor closely".to_string());
        }
        strategies
    }

    fn critical_paths(&self, graph: &DependencyGraph) -> Vec<CriticalPath> {
        graph
            .longest_chains()
            .into_iter()
            .filter(|chain| chain.len() >= self.config.min_chain_length)
            .take(self.config.max_critical_paths)
            .map(|chain| {
                let risky = chain
                    .iter()
                    .filter_map(|id| graph.node(id))
                    .any(|node| self.is_critical(node.importance));
                CriticalPath {
                    length: chain.len(),
                    risk: if risky { PathRisk::High } else { PathRisk::Medium },
                    chain,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ImpactAnalyzer {
        ImpactAnalyzer::new(ImpactConfig::default())
    }

    /// `(id, importance, connects_to)` triples.
    fn graph(shape: &[(&str, u8, &[&str])]) -> DependencyGraph {
        let nodes = shape
            .iter()
            .map(|(id, importance, targets)| {
                targets
                    .iter()
                    .fold(DependencyNode::new(*id, *importance), |node, t| node.connects_to(*t))
            })
            .collect();
        let (graph, diagnostics) = DependencyGraph::build(nodes);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
        graph
    }

    #[test]
    fn test_spof_needs_both_thresholds() {
        // hub: 60 + 6 * 5 = 90 with six dependents; five: 100 with exactly five
        let leaf: &[&str] = &[];
        let on_hub: &[&str] = &["hub"];
        let on_five: &[&str] = &["five"];
        let mut shape = vec![("hub", 60, leaf), ("five", 100, leaf)];
        for id in ["d1", "d2", "d3", "d4", "d5", "d6"] {
            shape.push((id, 10, on_hub));
        }
        for id in ["e1", "e2", "e3", "e4", "e5"] {
            shape.push((id, 10, on_five));
        }

        let report = analyzer().analyze(&graph(&shape));

        let spofs: Vec<&str> = report
            .single_points_of_failure
            .iter()
            .map(|s| s.component.as_str())
            .collect();
        assert_eq!(spofs, vec!["hub"]);
        assert_eq!(
            report.single_points_of_failure[0].reason,
            "criticality 90 with 6 components depending on it"
        );

        let five = &report.components[0];
        assert_eq!((five.id.as_str(), five.criticality_score, five.blast_radius), ("five", 100, 5));
        assert!(!five.is_single_point_of_failure);
        assert_eq!(five.severity, FailureSeverity::Catastrophic);
    }

    #[test]
    fn test_components_ranked_by_criticality_then_id() {
        let report = analyzer().analyze(&graph(&[
            ("zeta", 40, &[]),
            ("beta", 30, &["zeta"]),
            ("alpha", 30, &["zeta"]),
            ("core", 90, &[]),
        ]));

        let order: Vec<&str> = report.components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["core", "zeta", "alpha", "beta"]);
        assert_eq!(report.components[1].criticality_score, 50);
        assert!(report.single_points_of_failure.is_empty());

        let limited = ImpactAnalyzer::new(ImpactConfig {
            top_components: 2,
            ..ImpactConfig::default()
        })
        .analyze(&graph(&[("zeta", 40, &[]), ("alpha", 30, &["zeta"]), ("core", 90, &[])]));
        assert_eq!(limited.top_components, vec!["core", "zeta"]);
    }

    #[test]
    fn test_criticality_capped() {
        let a = analyzer();
        assert_eq!(a.criticality(50, 0), 50);
        assert_eq!(a.criticality(50, 4), 70);
        assert_eq!(a.criticality(95, 3), 100);
        assert_eq!(a.criticality(u8::MAX, usize::MAX), 100);
    }

    #[test]
    fn test_severity_ladder() {
        let a = analyzer();
        assert_eq!(a.severity(true, 5), FailureSeverity::Catastrophic);
        assert_eq!(a.severity(true, 0), FailureSeverity::Severe);
        assert_eq!(a.severity(false, 10), FailureSeverity::Severe);
        assert_eq!(a.severity(false, 5), FailureSeverity::Moderate);
        assert_eq!(a.severity(false, 4), FailureSeverity::Low);
    }

    #[test]
    fn test_mitigations() {
        let a = analyzer();
        let plain = DependencyNode::new("a", 10);
        assert_eq!(a.mitigations(&plain, 0, false), vec!["Monitor closely"]);

        let mut external = DependencyNode::new("b", 95);
        external.external_dependencies.push("BigQuery".to_string());
        assert_eq!(
            a.mitigations(&external, 6, true),
            vec![
                "Implement circuit breaker pattern",
                "Add caching layer in front of BigQuery",
                "Set up redundancy/failover",
            ]
        );
    }
}
