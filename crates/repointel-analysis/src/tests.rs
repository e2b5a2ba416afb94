//! Unit tests for repointel-analysis

use crate::*;
use repointel_core::{
    ConfigError, Diagnostic, DiagnosticKind, EngineConfig, Manifest, ManifestEntry, MatchKind,
};
use repointel_indexer::{Corpus, SourceFile};

fn fence(language: &str, body: &[&str]) -> String {
    format!("```{}\n{}\n```\n", language, body.join("\n"))
}

fn numbered(lines: usize) -> Vec<String> {
    (1..=lines).map(|i| format!("step_{i} = run(step_{i})")).collect()
}

fn engine() -> Engine {
    Engine::new(EngineConfig::default()).expect("default config is valid")
}

fn inputs(files: Vec<SourceFile>, manifest: Manifest) -> Inputs {
    Inputs::new(Corpus::from_files("/corpus", files), manifest)
}

#[test]
fn test_invalid_threshold_rejected() {
    let mut config = EngineConfig::default();
    config.redundancy.similarity_threshold = 1.5;
    assert!(matches!(
        Engine::new(config),
        Err(ConfigError::OutOfRange { .. })
    ));
}

#[test]
fn test_identical_fences_across_files() {
    let body = numbered(10);
    let body: Vec<&str> = body.iter().map(String::as_str).collect();
    let shared = fence("python", &body);
    let other = fence("sh", &["ls -la /tmp", "cd /var/log", "echo finished"]);

    let inputs = inputs(
        vec![
            SourceFile::new("x.md", format!("# X\n\n{shared}")),
            SourceFile::new("y.md", format!("# Y\n\n{shared}")),
            SourceFile::new("z.md", format!("# Z\n\n{other}")),
        ],
        Manifest::default(),
    );

    let report = engine().analyze(&inputs, &[Analysis::Redundancy]);
    let redundancy = report.redundancy.expect("redundancy requested");

    assert_eq!(redundancy.blocks_analyzed, 3);
    assert_eq!(redundancy.total_clusters, 1);
    let cluster = &redundancy.clusters[0];
    assert_eq!(cluster.match_kind, MatchKind::Exact);
    assert_eq!(cluster.len(), 2);
    assert_eq!(cluster.similarity_score, 1.0);
    assert_eq!(cluster.potential_savings_lines, 9);
    assert!(cluster.members.iter().all(|m| m.source_file.to_str() != Some("z.md")));
}

#[test]
fn test_unrequested_sections_stay_empty() {
    let inputs = inputs(vec![SourceFile::new("a.md", "# A\n")], Manifest::default());
    let report = engine().analyze(&inputs, &[Analysis::Complexity]);

    assert!(report.redundancy.is_none());
    assert!(report.impact.is_none());
    assert!(report.capabilities.is_none());
    assert_eq!(report.complexity.map(|c| c.summary.files_analyzed), Some(1));
}

#[test]
fn test_graph_diagnostics_follow_input_diagnostics() {
    let manifest = Manifest::new(vec![
        ManifestEntry::new("api.py").connects_to("db.py"),
        ManifestEntry::new("db.py").connects_to("ghost.py"),
    ]);
    let mut inputs = inputs(Vec::new(), manifest);
    inputs.diagnostics.push(Diagnostic::new(
        DiagnosticKind::UnreadableFile,
        "big.md",
        "file too large",
    ));

    let report = engine().analyze(&inputs, &[Analysis::Impact]);
    let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::UnreadableFile, DiagnosticKind::DanglingEdge]);

    let impact = report.impact.expect("impact requested");
    let db = impact.components.iter().find(|c| c.id == "db.py").expect("db.py present");
    assert_eq!(db.blast_radius, 1);
}

#[test]
fn test_capabilities_sorted_by_confidence() {
    let manifest = Manifest::new(vec![
        ManifestEntry::new("ops/journey_coordinator.py").with_category("orchestration"),
        ManifestEntry::new("ops/chaos_monkey.py").with_category("chaos"),
        ManifestEntry::new("metrics/performance_monitor.py").with_category("monitoring"),
        ManifestEntry::new("etl/nightly_pipeline.py").with_category("data_pipeline"),
    ]);

    let capabilities = engine().infer_capabilities(&manifest);
    let rules: Vec<&str> = capabilities.iter().map(|c| c.rule.as_str()).collect();
    assert_eq!(rules, vec!["self_testing", "auto_optimization"]);
    assert!(capabilities
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));
}

#[test]
fn test_redundancy_text_rendering() {
    let body = numbered(3);
    let body: Vec<&str> = body.iter().map(String::as_str).collect();
    let shared = fence("sh", &body);
    let inputs = inputs(
        vec![
            SourceFile::new("a.md", shared.clone()),
            SourceFile::new("b.md", shared),
        ],
        Manifest::default(),
    );

    let report = engine().analyze(&inputs, &[Analysis::Redundancy]);
    insta::assert_snapshot!(report.render_text().trim_end(), @r"
    redundancy: 1 clusters, 2 duplicate blocks, 2 lines removable (2 blocks, 0 comparisons)
    cluster 1: 2 blocks, similarity 1.00, savings 2 lines
      at a.md:2-4 (3 lines)
      at b.md:2-4 (3 lines)
      hint: Code appears in 2 files - consider creating shared module
    ");
}
