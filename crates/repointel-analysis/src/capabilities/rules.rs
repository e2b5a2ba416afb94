//! The capability rules, one strategy per pattern

use std::collections::BTreeMap;

use repointel_core::{Effort, Evidence, InferredCapability, ManifestEntry};

use super::{InferenceContext, Tag};

/// One independent inference pattern.
pub trait CapabilityRule: Send + Sync {
    /// Stable identifier, copied onto every capability the rule emits.
    fn id(&self) -> &'static str;

    fn evaluate(&self, ctx: &InferenceContext<'_>) -> Vec<InferredCapability>;
}

/// The built-in rules in evaluation order.
pub fn default_rules() -> Vec<Box<dyn CapabilityRule>> {
    vec![
        Box::new(SelfTesting),
        Box::new(MultiModelTesting),
        Box::new(AutoOptimization),
        Box::new(Consolidation),
        Box::new(PredictiveOpportunity),
    ]
}

fn cite(entries: &[&ManifestEntry], reason: &str) -> Vec<Evidence> {
    entries.iter().map(|e| Evidence::new(e.path.clone(), reason)).collect()
}

/// Orchestration plus chaos testing: features can validate themselves.
pub struct SelfTesting;

impl CapabilityRule for SelfTesting {
    fn id(&self) -> &'static str {
        "self_testing"
    }

    fn evaluate(&self, ctx: &InferenceContext<'_>) -> Vec<InferredCapability> {
        let orchestration = ctx.tagged(Tag::Orchestration);
        let chaos = ctx.tagged(Tag::Chaos);
        if orchestration.is_empty() || chaos.is_empty() {
            return Vec::new();
        }

        let mut evidence = cite(&orchestration, "orchestration");
        evidence.extend(cite(&chaos, "chaos/resilience testing"));

        vec![InferredCapability {
            rule: self.id().to_string(),
            name: "Self-Healing Feature Validation".to_string(),
            description:
                "Orchestrated features can trigger their own chaos tests to validate resilience"
                    .to_string(),
            evidence,
            confidence: ctx.config.self_testing_confidence,
            implementation_effort: Effort::Medium,
            potential_value: "Zero-downtime deployments with automatic validation".to_string(),
        }]
    }
}

/// Several models plus an orchestrator: route traffic across model versions.
pub struct MultiModelTesting;

impl CapabilityRule for MultiModelTesting {
    fn id(&self) -> &'static str {
        "multi_model_testing"
    }

    fn evaluate(&self, ctx: &InferenceContext<'_>) -> Vec<InferredCapability> {
        let models = ctx.tagged(Tag::MachineLearning);
        let orchestration = ctx.tagged(Tag::Orchestration);
        if models.len() < 2 || orchestration.is_empty() {
            return Vec::new();
        }

        let mut evidence = cite(&models[..2], "independent model");
        evidence.extend(cite(&orchestration[..1], "orchestration"));

        vec![InferredCapability {
            rule: self.id().to_string(),
            name: "Multi-Model A/B Testing".to_string(),
            description: format!(
                "Orchestration can serve {} model versions side by side and compare them live",
                models.len()
            ),
            evidence,
            confidence: ctx.config.multi_model_confidence,
            implementation_effort: Effort::Low,
            potential_value: "Continuous model improvement without deployment risk".to_string(),
        }]
    }
}

/// Monitoring plus a data pipeline: tune the pipeline from its own metrics.
pub struct AutoOptimization;

impl CapabilityRule for AutoOptimization {
    fn id(&self) -> &'static str {
        "auto_optimization"
    }

    fn evaluate(&self, ctx: &InferenceContext<'_>) -> Vec<InferredCapability> {
        let performance = ctx.tagged(Tag::Performance);
        let pipelines = ctx.tagged(Tag::DataPipeline);
        if performance.is_empty() || pipelines.is_empty() {
            return Vec::new();
        }

        let mut evidence = cite(&performance, "performance monitoring");
        evidence.extend(cite(&pipelines[..pipelines.len().min(2)], "data pipeline"));

        vec![InferredCapability {
            rule: self.id().to_string(),
            name: "Automated Pipeline Optimization".to_string(),
            description: "Monitoring can spot slow pipeline stages and tune them automatically"
                .to_string(),
            evidence,
            confidence: ctx.config.auto_optimization_confidence,
            implementation_effort: Effort::Medium,
            potential_value: "Faster queries and pipelines without manual tuning".to_string(),
        }]
    }
}

/// A crowded category: its files could become one module.
pub struct Consolidation;

impl CapabilityRule for Consolidation {
    fn id(&self) -> &'static str {
        "consolidation"
    }

    fn evaluate(&self, ctx: &InferenceContext<'_>) -> Vec<InferredCapability> {
        let mut by_category: BTreeMap<&str, Vec<&ManifestEntry>> = BTreeMap::new();
        for entry in &ctx.manifest.entries {
            by_category.entry(entry.category.as_str()).or_default().push(entry);
        }

        by_category
            .into_iter()
            .filter(|(category, files)| {
                files.len() > ctx.config.consolidation_min_group
                    && !ctx.config.ignored_categories.iter().any(|c| c.as_str() == *category)
            })
            .map(|(category, files)| {
                let cited = &files[..files.len().min(ctx.config.max_evidence_per_group)];
                InferredCapability {
                    rule: self.id().to_string(),
                    name: format!("Unified {} Platform", title_case(category)),
                    description: format!(
                        "Consolidate {} {} files into a single cohesive module",
                        files.len(),
                        category
                    ),
                    evidence: cite(cited, &format!("one of {} files in {}", files.len(), category)),
                    confidence: ctx.config.consolidation_confidence,
                    implementation_effort: Effort::Medium,
                    potential_value: format!(
                        "Lower maintenance and one consistent interface for {}",
                        category
                    ),
                }
            })
            .collect()
    }
}

/// Data with no declared link to any model: a new prediction target.
pub struct PredictiveOpportunity;

impl CapabilityRule for PredictiveOpportunity {
    fn id(&self) -> &'static str {
        "predictive_opportunity"
    }

    fn evaluate(&self, ctx: &InferenceContext<'_>) -> Vec<InferredCapability> {
        let models = ctx.tagged(Tag::MachineLearning);
        let Some(first_model) = models.first() else {
            return Vec::new();
        };

        ctx.tagged(Tag::Data)
            .into_iter()
            .filter(|data| !ctx.has_tag(data, Tag::MachineLearning))
            .filter(|data| {
                !models
                    .iter()
                    .any(|model| ctx.manifest.connected(&data.path, &model.path))
            })
            .map(|data| {
                let effort = if data.connects_to.is_empty() {
                    Effort::High
                } else {
                    Effort::Medium
                };
                InferredCapability {
                    rule: self.id().to_string(),
                    name: format!("Predictive Insights from {}", data.path),
                    description: format!(
                        "{} is not yet connected to any model; existing ML infrastructure could learn from it",
                        data.path
                    ),
                    evidence: vec![
                        Evidence::new(data.path.clone(), "data source without a model"),
                        Evidence::new(first_model.path.clone(), "existing model infrastructure"),
                    ],
                    confidence: ctx.config.predictive_confidence,
                    implementation_effort: effort,
                    potential_value: "New predictions from data that is already collected"
                        .to_string(),
                }
            })
            .collect()
    }
}

fn title_case(category: &str) -> String {
    category
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
