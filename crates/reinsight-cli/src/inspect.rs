//! # Inspect Subcommand
//!
//! Prints a per-(date, area) summary of a snapshot: how many exchanges
//! each batch holds and how many of their result entries classify to a
//! known indicator. Useful after a capture session to spot areas whose
//! probes came back unrecognizable before merging them into the store.

use std::fmt::Write;
use std::path::PathBuf;

use clap::Args;
use reinsight_core::Snapshot;
use reinsight_decode::classify;

use crate::store;

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Snapshot file to summarize.
    #[arg(long)]
    pub input: PathBuf,
}

pub fn run(args: &InspectArgs) -> anyhow::Result<()> {
    let snapshot = store::read_snapshot(&args.input)?;
    print!("{}", render_summary(&snapshot));
    Ok(())
}

/// One line per (date, area) pair plus a totals line.
fn render_summary(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let mut areas = 0usize;
    for (date_key, area, exchanges) in snapshot.pairs() {
        areas += 1;
        let classified: usize = exchanges
            .iter()
            .flat_map(|exchange| {
                exchange.results().iter().filter(|entry| {
                    exchange
                        .resolve_answering_view(entry)
                        .and_then(|view| classify(&view))
                        .is_some()
                })
            })
            .count();
        let _ = writeln!(
            out,
            "{date_key} / {area}: {} exchanges, {classified} classified results",
            exchanges.len()
        );
    }
    let _ = writeln!(
        out,
        "total: {} dates, {areas} areas, {} exchanges",
        snapshot.0.len(),
        snapshot.exchange_count()
    );
    out
}
