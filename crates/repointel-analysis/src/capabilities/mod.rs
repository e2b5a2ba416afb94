//! Heuristic capability inference over manifest metadata
//!
//! Files are tagged from their category and path, then every rule in
//! [`default_rules`] runs over the same snapshot. Rules are independent and
//! may fire on overlapping evidence.

pub mod rules;

use repointel_core::{CapabilityConfig, InferredCapability, Manifest, ManifestEntry, TagSignals};
use tracing::{debug, info};

pub use rules::{default_rules, CapabilityRule};

/// Signals a manifest file can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Orchestration,
    Chaos,
    MachineLearning,
    Performance,
    DataPipeline,
    Data,
}

impl Tag {
    pub const ALL: [Tag; 6] = [
        Tag::Orchestration,
        Tag::Chaos,
        Tag::MachineLearning,
        Tag::Performance,
        Tag::DataPipeline,
        Tag::Data,
    ];

    fn signals(self, config: &CapabilityConfig) -> &TagSignals {
        let tags = &config.tags;
        match self {
            Tag::Orchestration => &tags.orchestration,
            Tag::Chaos => &tags.chaos,
            Tag::MachineLearning => &tags.machine_learning,
            Tag::Performance => &tags.performance,
            Tag::DataPipeline => &tags.data_pipeline,
            Tag::Data => &tags.data,
        }
    }
}

/// Read-only view shared by every rule.
pub struct InferenceContext<'a> {
    pub manifest: &'a Manifest,
    pub config: &'a CapabilityConfig,
}

impl<'a> InferenceContext<'a> {
    pub fn new(manifest: &'a Manifest, config: &'a CapabilityConfig) -> Self {
        InferenceContext { manifest, config }
    }

    /// Manifest entries carrying `tag`, in manifest order.
    pub fn tagged(&self, tag: Tag) -> Vec<&'a ManifestEntry> {
        let signals = tag.signals(self.config);
        self.manifest
            .entries
            .iter()
            .filter(|e| signals.matches(&e.path, &e.category))
            .collect()
    }

    pub fn has_tag(&self, entry: &ManifestEntry, tag: Tag) -> bool {
        tag.signals(self.config).matches(&entry.path, &entry.category)
    }
}

pub struct CapabilityInferencer {
    config: CapabilityConfig,
    rules: Vec<Box<dyn CapabilityRule>>,
}

impl CapabilityInferencer {
    pub fn new(config: CapabilityConfig) -> Self {
        Self::with_rules(config, default_rules())
    }

    pub fn with_rules(config: CapabilityConfig, rules: Vec<Box<dyn CapabilityRule>>) -> Self {
        CapabilityInferencer { config, rules }
    }

    /// Run every rule; results sorted by confidence, ties in rule order.
    pub fn infer(&self, manifest: &Manifest) -> Vec<InferredCapability> {
        if manifest.is_empty() {
            return Vec::new();
        }

        let context = InferenceContext::new(manifest, &self.config);
        for tag in Tag::ALL {
            debug!("{:?}: {} files", tag, context.tagged(tag).len());
        }

        let mut capabilities: Vec<InferredCapability> = self
            .rules
            .iter()
            .flat_map(|rule| {
                let found = rule.evaluate(&context);
                debug!("rule {} produced {} capabilities", rule.id(), found.len());
                found
            })
            .collect();

        capabilities.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        info!("inferred {} capabilities", capabilities.len());
        capabilities
    }
}
