//! Weighted 0-100 complexity score and refactor flags

use std::path::Path;

use repointel_core::{
    ComplexityConfig, ComplexityMetrics, ComplexityReport, ComplexitySummary, RefactorReason,
};
use repointel_indexer::{file_stats, Corpus, FileStats};
use tracing::info;

const LINE_WEIGHT: f64 = 50.0;
const LINE_SCALE: f64 = 1000.0;
const FUNCTION_WEIGHT: f64 = 20.0;
const FUNCTION_SCALE: f64 = 30.0;
const SECTION_WEIGHT: f64 = 20.0;
const SECTION_SCALE: f64 = 50.0;
const IMPORT_WEIGHT: f64 = 10.0;
const IMPORT_SCALE: f64 = 20.0;

/// Each term is capped at its weight before summing, so the total stays
/// within 0-100.
pub fn complexity_score(stats: &FileStats) -> f64 {
    let term = |count: u32, scale: f64, weight: f64| (count as f64 / scale * weight).min(weight);

    let total = term(stats.line_count, LINE_SCALE, LINE_WEIGHT)
        + term(stats.function_count, FUNCTION_SCALE, FUNCTION_WEIGHT)
        + term(stats.section_count, SECTION_SCALE, SECTION_WEIGHT)
        + term(stats.import_count, IMPORT_SCALE, IMPORT_WEIGHT);
    total.min(100.0)
}

pub struct ComplexityScorer {
    config: ComplexityConfig,
}

impl ComplexityScorer {
    pub fn new(config: ComplexityConfig) -> Self {
        ComplexityScorer { config }
    }

    pub fn measure(&self, file: &Path, stats: FileStats) -> ComplexityMetrics {
        let score = complexity_score(&stats);

        let mut reasons = Vec::new();
        if stats.line_count > self.config.max_lines {
            reasons.push(RefactorReason::LargeFile);
        }
        if stats.function_count > self.config.max_functions {
            reasons.push(RefactorReason::ManyFunctions);
        }
        if score > self.config.max_score {
            reasons.push(RefactorReason::HighScore);
        }

        ComplexityMetrics {
            file: file.to_path_buf(),
            line_count: stats.line_count,
            function_count: stats.function_count,
            section_count: stats.section_count,
            import_count: stats.import_count,
            score,
            needs_refactoring: !reasons.is_empty(),
            reasons,
        }
    }

    pub fn score_corpus(&self, corpus: &Corpus) -> ComplexityReport {
        let metrics = corpus
            .files
            .iter()
            .map(|file| self.measure(&file.path, file_stats(file)))
            .collect();
        self.summarize(metrics)
    }

    /// Sort by score descending (then path) and compute the aggregates.
    pub fn summarize(&self, mut files: Vec<ComplexityMetrics>) -> ComplexityReport {
        files.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.file.cmp(&b.file)));

        let files_analyzed = files.len();
        let flagged = files.iter().filter(|m| m.needs_refactoring).count();
        let (average_score, refactoring_percentage) = if files_analyzed == 0 {
            (0.0, 0.0)
        } else {
            let n = files_analyzed as f64;
            (
                files.iter().map(|m| m.score).sum::<f64>() / n,
                flagged as f64 / n * 100.0,
            )
        };

        let summary = ComplexitySummary {
            files_analyzed,
            average_score,
            files_needing_refactoring: flagged,
            refactoring_percentage,
            total_lines: files.iter().map(|m| m.line_count as u64).sum(),
            most_complex: files
                .iter()
                .take(self.config.top_files)
                .map(|m| m.file.clone())
                .collect(),
        };

        info!(
            "complexity: {} files, {} need refactoring",
            summary.files_analyzed, summary.files_needing_refactoring
        );
        ComplexityReport { files, summary }
    }
}
