//! Integration tests for repointel
//!
//! These tests run the engine and the CLI against corpora written to a
//! temporary directory.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use repointel_analysis::{Analysis, Engine};
use repointel_core::{DiagnosticKind, EngineConfig, RefactorReason, Report};
use tempfile::TempDir;

const MANIFEST: &str = ".repometa/manifest.yaml";

fn write_corpus(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(full, content).expect("write test file");
    }
    dir
}

fn fence(language: &str, lines: &[String]) -> String {
    format!("```{}\n{}\n```\n", language, lines.join("\n"))
}

fn run(root: &Path, config: EngineConfig) -> Report {
    Engine::new(config)
        .expect("valid config")
        .run(root)
        .expect("engine run")
}

fn repointel(root: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_repointel"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("Failed to execute repointel")
}

#[test]
fn test_cli_invocation() {
    let output = Command::new(env!("CARGO_BIN_EXE_repointel"))
        .arg("--help")
        .output()
        .expect("Failed to execute repointel");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("repointel"));
    assert!(stdout.contains("redundancy"));
}

#[test]
fn test_identical_block_in_two_files() {
    let shared: Vec<String> = (1..=10).map(|i| format!("deploy_{i} = stage(deploy_{i})")).collect();
    let unrelated = vec![
        "kubectl get pods".to_string(),
        "kubectl describe node".to_string(),
        "journalctl --unit kubelet".to_string(),
    ];
    let x = format!("# Deploy\n\n{}", fence("python", &shared));
    let y = format!("# Rollback\n\nSame steps:\n\n{}", fence("python", &shared));
    let z = format!("# Debug\n\n{}", fence("sh", &unrelated));
    let dir = write_corpus(&[("x.md", &x), ("y.md", &y), ("z.md", &z)]);

    let report = run(dir.path(), EngineConfig::default());
    let redundancy = report.redundancy.expect("redundancy section");

    assert_eq!(redundancy.total_clusters, 1);
    let cluster = &redundancy.clusters[0];
    assert_eq!(cluster.len(), 2);
    assert_eq!(cluster.potential_savings_lines, 9);
    let files: Vec<String> = cluster
        .members
        .iter()
        .map(|m| m.source_file.display().to_string())
        .collect();
    assert_eq!(files, vec!["x.md", "y.md"]);
}

#[test]
fn test_chain_blast_radius() {
    let manifest = "\
structure:
  - path: a.py
    connects_to: [b.py]
  - path: b.py
    connects_to: [c.py]
  - path: c.py
";
    let dir = write_corpus(&[(MANIFEST, manifest), ("readme.md", "# Readme\n")]);

    let report = run(dir.path(), EngineConfig::default());
    let impact = report.impact.expect("impact section");
    let radius = |id: &str| {
        impact
            .components
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.blast_radius)
    };

    assert_eq!(radius("c.py"), Some(2));
    assert_eq!(radius("b.py"), Some(1));
    assert_eq!(radius("a.py"), Some(0));
    assert!(impact.cycles.is_empty());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_long_playbook_needs_refactoring() {
    let mut lines: Vec<String> = (1..=36).map(|i| format!("## Step {i}")).collect();
    lines.push("```python".to_string());
    lines.extend((1..=7).map(|i| format!("def handler_{i}(event):")));
    lines.push("```".to_string());
    while lines.len() < 1219 {
        lines.push(format!("Line {} of the operating notes.", lines.len() + 1));
    }
    let doc = format!("{}\n", lines.join("\n"));
    let dir = write_corpus(&[("docs/playbook.md", &doc)]);

    let report = run(dir.path(), EngineConfig::default());
    let complexity = report.complexity.expect("complexity section");
    let playbook = &complexity.files[0];

    assert_eq!(playbook.line_count, 1219);
    assert_eq!(playbook.function_count, 7);
    assert_eq!(playbook.section_count, 36);
    assert_eq!(playbook.import_count, 0);
    assert!((playbook.score - 69.07).abs() < 0.01, "score was {}", playbook.score);
    assert!(playbook.needs_refactoring);
    assert_eq!(playbook.reasons, vec![RefactorReason::LargeFile]);
    assert_eq!(complexity.summary.files_needing_refactoring, 1);
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let shared: Vec<String> = (1..=5).map(|i| format!("sync_{i} = copy(sync_{i})")).collect();
    let block = fence("python", &shared);
    let manifest = "\
structure:
  - path: etl/pipeline.py
    category: data_pipeline
    connects_to: [store/bigquery.py]
  - path: store/bigquery.py
    category: data
    importance: critical
  - path: ml/churn_model.py
    category: ai_ml
";
    let dir = write_corpus(&[
        (MANIFEST, manifest),
        ("a.md", &block),
        ("b.md", &block),
        ("nested/c.md", &block),
    ]);

    let first = repointel(dir.path(), &["--format", "json", "full"]);
    let second = repointel(dir.path(), &["--format", "json", "full"]);

    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert!(!first.stdout.is_empty());
    assert_eq!(first.stdout, second.stdout);

    let parsed: serde_json::Value = serde_json::from_slice(&first.stdout).expect("valid JSON");
    assert_eq!(parsed["redundancy"]["total_clusters"], 1);
}

#[test]
fn test_raising_threshold_only_splits_clusters() {
    // Each file shares a sliding window of tokens with its neighbours.
    let files: Vec<(String, String)> = (0..5)
        .map(|k| {
            let words: Vec<String> = (k * 2..k * 2 + 10).map(|j| format!("word_{j}")).collect();
            (format!("f{k}.md"), fence("text", &words))
        })
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
    let dir = write_corpus(&refs);

    let clusters_at = |threshold: f64| -> Vec<BTreeSet<String>> {
        let mut config = EngineConfig::default();
        config.redundancy.similarity_threshold = threshold;
        let engine = Engine::new(config).expect("valid config");
        let inputs = engine.load(dir.path()).expect("load corpus");
        let report = engine.analyze(&inputs, &[Analysis::Redundancy]);
        report
            .redundancy
            .expect("redundancy section")
            .clusters
            .iter()
            .map(|c| c.members.iter().map(|m| m.block_id.to_string()).collect())
            .collect()
    };

    let thresholds = [0.3, 0.5, 0.6, 0.8];
    let runs: Vec<Vec<BTreeSet<String>>> = thresholds.iter().map(|&t| clusters_at(t)).collect();

    assert_eq!(runs[0].len(), 1, "low threshold links the whole chain");
    assert!(runs[3].is_empty(), "no pair reaches 0.8");

    for pair in runs.windows(2) {
        let (looser, stricter) = (&pair[0], &pair[1]);
        let clustered = |run: &[BTreeSet<String>]| run.iter().map(BTreeSet::len).sum::<usize>();
        assert!(clustered(stricter) <= clustered(looser));
        for cluster in stricter {
            assert!(looser.iter().any(|c| cluster.is_subset(c)));
        }
    }
}

#[test]
fn test_missing_manifest_is_a_diagnostic() {
    let dir = write_corpus(&[("notes.md", "# Notes\n\nNothing to see.\n")]);

    let report = run(dir.path(), EngineConfig::default());

    let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::MissingManifest]);
    assert!(report.impact.expect("impact section").components.is_empty());
    assert!(report.capabilities.expect("capabilities section").is_empty());
    assert_eq!(report.complexity.expect("complexity section").summary.files_analyzed, 1);
}

#[test]
fn test_out_of_range_threshold_fails() {
    let dir = write_corpus(&[("notes.md", "# Notes\n")]);

    let output = repointel(dir.path(), &["--threshold", "1.5", "redundancy"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
