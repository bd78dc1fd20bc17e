//! # reinsight CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Metrics store toolchain for captured analytics snapshots.
///
/// Merges fresh capture snapshots into prior state, transforms snapshots
/// into per-area metrics reports, and inspects snapshot contents.
#[derive(Parser, Debug)]
#[command(name = "reinsight", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fold a freshly captured snapshot into prior state.
    Merge(reinsight_cli::merge::MergeArgs),
    /// Transform a snapshot into a metrics report.
    Transform(reinsight_cli::transform::TransformArgs),
    /// Summarize a snapshot's dates, areas, and classified queries.
    Inspect(reinsight_cli::inspect::InspectArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Merge(args) => reinsight_cli::merge::run(&args),
        Commands::Transform(args) => reinsight_cli::transform::run(&args),
        Commands::Inspect(args) => reinsight_cli::inspect::run(&args),
    }
}
