//! # Bundle Assembly
//!
//! Folds one area's exchange batch into a [`MetricBundle`]. Every result
//! entry of every exchange goes through the same three stages: resolve
//! which query it answers, classify that query into an indicator slot,
//! decode the entry according to the slot's row shape. Any stage failing
//! skips the entry and leaves its slot unset.

use reinsight_core::CapturedExchange;
use reinsight_decode::{classify, decode};

use crate::bundle::MetricBundle;

/// Assemble the metric bundle for one area's exchange batch.
///
/// Batch order matters only when two entries fill the same slot: the
/// later one wins, consistent with the merge discipline that replaces a
/// re-captured exchange in place.
pub fn assemble(exchanges: &[CapturedExchange]) -> MetricBundle {
    let mut bundle = MetricBundle::default();
    for exchange in exchanges {
        for entry in exchange.results() {
            let Some(view) = exchange.resolve_answering_view(entry) else {
                continue;
            };
            let Some(slot) = classify(&view) else {
                continue;
            };
            let Some(value) = decode(entry, slot) else {
                continue;
            };
            bundle.apply(slot, value);
        }
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn query(select: &[&str], filters: &[(&str, &str)]) -> Value {
        let wheres: Vec<Value> = filters
            .iter()
            .map(|(subject, value)| {
                json!({
                    "Condition": {
                        "In": {
                            "Expressions": [{"Column": {"Property": subject}}],
                            "Values": [[{"Literal": {"Value": format!("'{value}'")}}]],
                        }
                    }
                })
            })
            .collect();
        json!({
            "Query": {
                "Commands": [{
                    "SemanticQueryDataShapeCommand": {
                        "Query": {
                            "Select": select.iter().map(|n| json!({"Name": n})).collect::<Vec<_>>(),
                            "Where": wheres,
                        }
                    }
                }]
            }
        })
    }

    fn scalar_result(job_id: &str, value: f64) -> Value {
        json!({
            "jobId": job_id,
            "result": {"data": {"dsr": {"DS": [{"PH": [{"DM0": [{"M0": value}]}]}]}}}
        })
    }

    fn exchange(queries: Vec<Value>, results: Vec<Value>) -> CapturedExchange {
        CapturedExchange {
            request: json!({"queries": queries}),
            response: json!({"results": results}),
        }
    }

    #[test]
    fn test_assemble_scalar_indicator() {
        let ex = exchange(
            vec![query(
                &["m.##Transaction Volume"],
                &[("Transaction Type", "Sales - Ready")],
            )],
            vec![scalar_result("0", 120.0)],
        );
        let bundle = assemble(&[ex]);
        assert_eq!(bundle.sales_volume.ready_properties, Some(120.0));
        assert_eq!(bundle.sales_volume.off_plan_properties, None);
    }

    #[test]
    fn test_assemble_routes_results_by_job_id() {
        // One exchange carrying two queries, each answered by its own
        // result entry.
        let ex = exchange(
            vec![
                query(
                    &["m.##Transaction Volume"],
                    &[("Transaction Type", "Sales - Ready")],
                ),
                query(
                    &["m.##Transaction Volume"],
                    &[("Transaction Type", "Sales - Off-Plan")],
                ),
            ],
            vec![scalar_result("0", 120.0), scalar_result("1", 45.0)],
        );
        let bundle = assemble(&[ex]);
        assert_eq!(bundle.sales_volume.ready_properties, Some(120.0));
        assert_eq!(bundle.sales_volume.off_plan_properties, Some(45.0));
    }

    #[test]
    fn test_assemble_month_series() {
        let ex = exchange(
            vec![query(
                &["Avg(pbi_ae_indicators_mv.Value)"],
                &[("Data Type", "Sales Prices")],
            )],
            vec![json!({
                "jobId": "0",
                "result": {"data": {"dsr": {"DS": [{
                    "PH": [{"DM0": [{"G0": 1_700_000_000_000i64, "X": [{"M0": 12.5}, {"M0": 8.3}]}]}],
                    "SH": [{"DM1": [{"G1": "Studio"}, {"G1": "1 Bedroom"}]}],
                }]}}}
            })],
        );
        let bundle = assemble(&[ex]);
        let trend = bundle.sales_price_trend.unwrap();
        assert_eq!(trend["2023-11"]["Studio"], 12.5);
        assert_eq!(trend["2023-11"]["1 Bedroom"], 8.3);
    }

    #[test]
    fn test_unclassified_and_undecodable_entries_leave_slots_unset() {
        let unclassified = exchange(
            vec![query(&["Area Name"], &[])],
            vec![scalar_result("0", 9.0)],
        );
        let undecodable = exchange(
            vec![query(
                &["m.#Listing Volume"],
                &[("Listing Type", "Sale")],
            )],
            vec![json!({"jobId": "0", "result": {}})],
        );
        assert_eq!(assemble(&[unclassified, undecodable]), MetricBundle::default());
    }

    #[test]
    fn test_later_exchange_overwrites_same_slot() {
        let make = |value| {
            exchange(
                vec![query(&["m.#Listing Volume"], &[("Listing Type", "Rent")])],
                vec![scalar_result("0", value)],
            )
        };
        let bundle = assemble(&[make(10.0), make(20.0)]);
        assert_eq!(bundle.rent_listing_volume, Some(20.0));
    }

    #[test]
    fn test_empty_batch_yields_default_bundle() {
        assert_eq!(assemble(&[]), MetricBundle::default());
    }
}
