//! Top-level engine: one corpus read, four independent analyses, one report

use std::path::Path;

use repointel_core::{
    ComplexityReport, ConfigError, DependencyGraph, Diagnostic, EngineConfig, ImpactReport,
    InferredCapability, Manifest, ManifestError, RedundancyReport, Report, ScanError,
};
use repointel_indexer::{extract_blocks, get_extractor, load_manifest, read_corpus, Corpus};
use thiserror::Error;
use tracing::info;

use crate::capabilities::CapabilityInferencer;
use crate::complexity::ComplexityScorer;
use crate::impact::ImpactAnalyzer;
use crate::redundancy::RedundancyClusterer;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Which analyses a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Analysis {
    Redundancy,
    Impact,
    Capabilities,
    Complexity,
}

impl Analysis {
    pub const ALL: [Analysis; 4] = [
        Analysis::Redundancy,
        Analysis::Impact,
        Analysis::Capabilities,
        Analysis::Complexity,
    ];
}

/// Everything read from disk for one run.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub corpus: Corpus,
    pub manifest: Manifest,
    /// Scan and manifest problems, in that order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Inputs {
    pub fn new(corpus: Corpus, manifest: Manifest) -> Self {
        Inputs {
            corpus,
            manifest,
            diagnostics: Vec::new(),
        }
    }
}

pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Rejects an invalid configuration before anything is read.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Engine { config })
    }

    /// Read the corpus and the manifest under `root` once.
    pub fn load(&self, root: &Path) -> Result<Inputs, EngineError> {
        let corpus = read_corpus(root, &self.config.scan)?;
        let (manifest, manifest_diagnostics) = load_manifest(root, &self.config.manifest)?;

        let mut diagnostics = corpus.diagnostics.clone();
        diagnostics.extend(manifest_diagnostics);

        Ok(Inputs {
            corpus,
            manifest,
            diagnostics,
        })
    }

    /// Load `root` and run every analysis.
    pub fn run(&self, root: &Path) -> Result<Report, EngineError> {
        let inputs = self.load(root)?;
        Ok(self.analyze(&inputs, &Analysis::ALL))
    }

    /// Run the selected analyses over already loaded inputs.
    pub fn analyze(&self, inputs: &Inputs, analyses: &[Analysis]) -> Report {
        let mut report = Report {
            diagnostics: inputs.diagnostics.clone(),
            ..Report::default()
        };

        for analysis in Analysis::ALL.iter().filter(|a| analyses.contains(a)) {
            match analysis {
                Analysis::Redundancy => {
                    report.redundancy = Some(self.scan_redundancies(&inputs.corpus));
                }
                Analysis::Impact => {
                    let (impact, diagnostics) = self.analyze_impact(&inputs.manifest);
                    report.impact = Some(impact);
                    report.diagnostics.extend(diagnostics);
                }
                Analysis::Capabilities => {
                    report.capabilities = Some(self.infer_capabilities(&inputs.manifest));
                }
                Analysis::Complexity => {
                    report.complexity = Some(self.score_complexity(&inputs.corpus));
                }
            }
        }

        info!(
            "analysis finished with {} diagnostics",
            report.diagnostics.len()
        );
        report
    }

    pub fn scan_redundancies(&self, corpus: &Corpus) -> RedundancyReport {
        let extractor = get_extractor(&self.config.redundancy);
        let blocks = extract_blocks(corpus, extractor.as_ref());
        RedundancyClusterer::new(self.config.redundancy.clone()).cluster(&blocks)
    }

    /// Impact figures plus the edge and duplicate problems found while
    /// building the graph.
    pub fn analyze_impact(&self, manifest: &Manifest) -> (ImpactReport, Vec<Diagnostic>) {
        let (graph, diagnostics) = DependencyGraph::build(manifest.dependency_nodes());
        let report = ImpactAnalyzer::new(self.config.impact.clone()).analyze(&graph);
        (report, diagnostics)
    }

    pub fn infer_capabilities(&self, manifest: &Manifest) -> Vec<InferredCapability> {
        CapabilityInferencer::new(self.config.capabilities.clone()).infer(manifest)
    }

    pub fn score_complexity(&self, corpus: &Corpus) -> ComplexityReport {
        ComplexityScorer::new(self.config.complexity.clone()).score_corpus(corpus)
    }
}
