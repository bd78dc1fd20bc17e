//! # Merge Subcommand
//!
//! Folds a freshly captured snapshot into prior state. Exchanges whose
//! canonical query key collides are replaced by the incoming capture;
//! everything else passes through untouched.

use std::path::PathBuf;

use clap::Args;
use reinsight_core::merge_snapshots;

use crate::store;

/// Arguments for the merge subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Previously persisted snapshot.
    #[arg(long)]
    pub existing: PathBuf,

    /// Freshly captured snapshot to fold in.
    #[arg(long)]
    pub incoming: PathBuf,

    /// Merged snapshot destination (stdout when omitted).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &MergeArgs) -> anyhow::Result<()> {
    let existing = store::read_snapshot(&args.existing)?;
    let incoming = store::read_snapshot(&args.incoming)?;
    let merged = merge_snapshots(&existing, &incoming);
    tracing::info!(
        existing = existing.exchange_count(),
        incoming = incoming.exchange_count(),
        merged = merged.exchange_count(),
        "merged snapshots"
    );
    store::write_json(args.output.as_deref(), &merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;

    fn keyed_exchange(field: &str, tag: u64) -> Value {
        json!({
            "request": {"queries": [{
                "Query": {"Commands": [{"SemanticQueryDataShapeCommand": {"Query": {
                    "Select": [{"Name": field}],
                }}}]}
            }]},
            "response": {"results": [], "tag": tag},
        })
    }

    #[test]
    fn test_merge_replaces_recaptured_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("existing.json");
        let incoming = dir.path().join("incoming.json");
        let output = dir.path().join("merged.json");

        let write = |path: &std::path::Path, exchange: Value| {
            let snapshot = json!({"01.06.2025": {"Business Bay": [exchange]}});
            fs::write(path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        };
        write(&existing, keyed_exchange("a", 1));
        write(&incoming, keyed_exchange("a", 2));

        run(&MergeArgs {
            existing,
            incoming,
            output: Some(output.clone()),
        })
        .unwrap();

        let merged: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let batch = merged["01.06.2025"]["Business Bay"].as_array().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0]["response"]["tag"], json!(2));
    }
}
