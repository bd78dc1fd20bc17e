//! # Transform Subcommand
//!
//! Reads a snapshot and writes the metrics report.

use std::path::PathBuf;

use clap::Args;
use reinsight_metrics::transform_snapshot;

use crate::store;

/// Arguments for the transform subcommand.
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Snapshot file to transform.
    #[arg(long)]
    pub input: PathBuf,

    /// Report destination (stdout when omitted).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &TransformArgs) -> anyhow::Result<()> {
    let snapshot = store::read_snapshot(&args.input)?;
    let report = transform_snapshot(&snapshot);
    tracing::info!(
        exchanges = snapshot.exchange_count(),
        dates = report.len(),
        "transformed snapshot"
    );
    store::write_json(args.output.as_deref(), &report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;

    #[test]
    fn test_transform_writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("snapshot.json");
        let output = dir.path().join("report.json");
        fs::write(
            &input,
            serde_json::to_string(&json!({"01.06.2025": {"Business Bay": []}})).unwrap(),
        )
        .unwrap();

        run(&TransformArgs {
            input,
            output: Some(output.clone()),
        })
        .unwrap();

        let report: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let bundle = &report["01.06.2025"]["Business Bay"];
        assert_eq!(bundle["sales_listing_volume"], Value::Null);
        assert!(bundle["sales_volume"].is_object());
    }

    #[test]
    fn test_transform_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(&TransformArgs {
            input: dir.path().join("absent.json"),
            output: None,
        });
        assert!(result.is_err());
    }
}
