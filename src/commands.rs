//! CLI command implementations

use std::path::PathBuf;

use anyhow::Context;
use repointel_analysis::{Analysis, Engine};
use repointel_indexer::load_config;

use crate::Format;

pub struct Options {
    pub root: PathBuf,
    pub format: Format,
    pub threshold: Option<f64>,
}

/// Load configuration and inputs under `root`, run `analyses` and print the report.
pub fn analyze(options: &Options, analyses: &[Analysis]) -> anyhow::Result<()> {
    let mut config = load_config(&options.root)
        .with_context(|| format!("loading configuration from {}", options.root.display()))?;
    if let Some(threshold) = options.threshold {
        config.redundancy.similarity_threshold = threshold;
    }

    let engine = Engine::new(config).context("invalid configuration")?;
    let inputs = engine
        .load(&options.root)
        .with_context(|| format!("reading {}", options.root.display()))?;
    tracing::info!(
        "Loaded {} files and {} manifest entries",
        inputs.corpus.len(),
        inputs.manifest.entries.len()
    );

    let report = engine.analyze(&inputs, analyses);
    match options.format {
        Format::Json => println!("{}", report.to_json().context("serializing report")?),
        Format::Text => print!("{}", report.render_text()),
    }
    Ok(())
}
