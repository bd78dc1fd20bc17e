//! # Snapshot Transformation
//!
//! The whole-snapshot entry point: every `(dateKey, areaName)` pair in
//! the snapshot produces exactly one bundle in the report, keyed
//! identically. Date keys are validated only for diagnostics — a
//! malformed key is logged and its data processed anyway.

use std::collections::BTreeMap;

use reinsight_core::{DateKey, Snapshot};

use crate::assemble::assemble;
use crate::bundle::MetricBundle;

/// The transformed output: `{dateKey → {areaName → bundle}}`.
pub type MetricsReport = BTreeMap<String, BTreeMap<String, MetricBundle>>;

/// Transform a snapshot into its metrics report.
pub fn transform_snapshot(snapshot: &Snapshot) -> MetricsReport {
    let mut report = MetricsReport::new();
    for (date_key, area, exchanges) in snapshot.pairs() {
        if let Err(error) = DateKey::parse(date_key) {
            tracing::warn!(%error, "snapshot carries a malformed date key");
        }
        report
            .entry(date_key.to_owned())
            .or_default()
            .insert(area.to_owned(), assemble(exchanges));
    }
    report
}
