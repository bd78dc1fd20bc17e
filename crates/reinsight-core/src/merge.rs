//! # Incremental Exchange Merge
//!
//! Re-running a capture for an overlapping date window must update exactly
//! the entries whose queries were re-issued and leave the rest untouched.
//! The merge joins batches on [`QueryKey`](crate::QueryKey): new keys are
//! appended, colliding keys are overwritten by the incoming exchange (it
//! carries fresher data), and exchanges that cannot be keyed are dropped —
//! a keyless exchange cannot be addressed for supersession later.
//!
//! The map is an explicit `Vec` + index rather than a nested
//! auto-vivifying structure: output order is existing-batch order followed
//! by genuinely new incoming keys in their own order, and it is stable
//! across re-merges.

use std::collections::HashMap;

use crate::canonical::{exchange_key, QueryKey};
use crate::exchange::{CapturedExchange, Snapshot};

/// Merge a freshly captured batch into a previously persisted one.
///
/// Properties: merging a batch against itself is idempotent; merging an
/// empty incoming batch is a no-op (up to dropped keyless entries); on
/// key collision the incoming exchange always wins.
pub fn merge_exchanges(
    existing: &[CapturedExchange],
    incoming: &[CapturedExchange],
) -> Vec<CapturedExchange> {
    let mut entries: Vec<(QueryKey, CapturedExchange)> = Vec::new();
    let mut index: HashMap<QueryKey, usize> = HashMap::new();

    let mut fold = |batch: &[CapturedExchange], origin: &str| {
        for exchange in batch {
            let Some(key) = exchange_key(exchange) else {
                tracing::debug!(origin, "dropping exchange with no canonical key");
                continue;
            };
            match index.get(&key) {
                Some(&slot) => entries[slot].1 = exchange.clone(),
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push((key, exchange.clone()));
                }
            }
        }
    };
    fold(existing, "existing");
    fold(incoming, "incoming");

    entries.into_iter().map(|(_, exchange)| exchange).collect()
}

/// Merge two whole snapshots, applying [`merge_exchanges`] per
/// (date, area) pair. Dates and areas union; pairs present only on one
/// side pass through (incoming-only pairs still shed keyless exchanges,
/// matching the per-pair merge they would get on the next re-capture).
pub fn merge_snapshots(existing: &Snapshot, incoming: &Snapshot) -> Snapshot {
    let mut merged = existing.clone();
    for (date_key, areas) in &incoming.0 {
        let merged_areas = merged.0.entry(date_key.clone()).or_default();
        for (area, batch) in areas {
            let prior = merged_areas.remove(area).unwrap_or_default();
            merged_areas.insert(area.clone(), merge_exchanges(&prior, batch));
        }
    }
    merged
}
