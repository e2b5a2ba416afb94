//! Repointel CLI entry point

use clap::{Parser, Subcommand, ValueEnum};
use repointel_analysis::Analysis;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

const LOG_TARGETS: [&str; 4] = [
    "repointel",
    "repointel_core",
    "repointel_indexer",
    "repointel_analysis",
];

#[derive(Parser)]
#[command(name = "repointel")]
#[command(about = "Static analysis of documentation-heavy repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository root path (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Override the similarity threshold for redundancy clustering
    #[arg(short, long, global = true)]
    threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster duplicated and near-duplicated code blocks
    Redundancy,
    /// Blast radius and single points of failure from the manifest
    Impact,
    /// Capabilities the existing components could enable together
    Capabilities,
    /// Per-file complexity scores and refactor candidates
    Complexity,
    /// Run every analysis
    Full,
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean report
    let log_level = if cli.verbose { "debug" } else { "info" };
    let directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(directives.join(",")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Repository root: {}", cli.root.display());

    let options = commands::Options {
        root: cli.root,
        format: cli.format,
        threshold: cli.threshold,
    };

    match cli.command {
        Commands::Redundancy => commands::analyze(&options, &[Analysis::Redundancy]),
        Commands::Impact => commands::analyze(&options, &[Analysis::Impact]),
        Commands::Capabilities => commands::analyze(&options, &[Analysis::Capabilities]),
        Commands::Complexity => commands::analyze(&options, &[Analysis::Complexity]),
        Commands::Full => commands::analyze(&options, &Analysis::ALL),
        Commands::Version => {
            println!("repointel v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
