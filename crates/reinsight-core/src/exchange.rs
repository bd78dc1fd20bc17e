//! # Captured-Exchange Snapshot Model
//!
//! A snapshot is the verbatim output of a capture session:
//! `{dateKey → {areaName → [exchange]}}`, where each exchange is one
//! recorded (query, response) pair against the analytics backend.
//!
//! ## Verbatim Invariant
//!
//! Exchange payloads are held as raw `serde_json::Value` trees. All typed
//! access goes through derived views (`QueryView`), never through lossy
//! deserialization, so a snapshot that is merged and written back contains
//! every field the capture session recorded — including ones this crate
//! has no model for.
//!
//! ## Query Structure
//!
//! The backend's request envelope nests the semantic query at
//! `queries[i].Query.Commands[0].SemanticQueryDataShapeCommand.Query`,
//! with an ordered `Select` array of output fields and a `Where` array of
//! filter conditions in either an `In` membership form or a `Comparison`
//! equality form. Both forms are folded into one flat
//! `subject → value-set` map; equality is indistinguishable from a
//! single-valued membership predicate after folding.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A whole capture snapshot: `{dateKey → {areaName → [exchange]}}`.
///
/// Keys are kept as plain strings; [`crate::temporal::DateKey`] parses
/// them on demand for diagnostics. `BTreeMap` gives deterministic
/// serialization order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub BTreeMap<String, BTreeMap<String, Vec<CapturedExchange>>>);

impl Snapshot {
    /// Parse a snapshot from its JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, crate::ReinsightError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Total number of exchanges across all dates and areas.
    pub fn exchange_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|areas| areas.values())
            .map(Vec::len)
            .sum()
    }

    /// Iterate `(dateKey, areaName, exchanges)` triples.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, &[CapturedExchange])> {
        self.0.iter().flat_map(|(date, areas)| {
            areas
                .iter()
                .map(move |(area, batch)| (date.as_str(), area.as_str(), batch.as_slice()))
        })
    }
}

/// One recorded probe/response pair. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedExchange {
    /// The outgoing analytical request, verbatim.
    pub request: Value,
    /// The returned payload, verbatim.
    pub response: Value,
}

/// The parsed, filterable surface of one query: its ordered output field
/// names and its flattened filter predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryView {
    /// Output field names, in `Select` order. Field 0 drives both
    /// canonicalization and indicator classification.
    pub select: Vec<String>,
    /// Flat predicate map: subject → sorted unique literal values.
    pub filters: BTreeMap<String, BTreeSet<String>>,
}

impl QueryView {
    /// The first selected field name, if any.
    pub fn first_select(&self) -> Option<&str> {
        self.select.first().map(String::as_str)
    }

    /// Whether `name` appears anywhere in the select list.
    pub fn selects(&self, name: &str) -> bool {
        self.select.iter().any(|s| s == name)
    }

    /// The first (sorted) value of a filter subject, if present.
    pub fn filter_value(&self, subject: &str) -> Option<&str> {
        self.filters
            .get(subject)
            .and_then(|vals| vals.iter().next())
            .map(String::as_str)
    }

    /// Overlay `other`'s filters on top of this view's, keeping `other`'s
    /// select list. Subjects present in both take `other`'s values.
    pub fn overlaid_with(&self, other: &QueryView) -> QueryView {
        let mut filters = self.filters.clone();
        for (subject, values) in &other.filters {
            filters.insert(subject.clone(), values.clone());
        }
        QueryView {
            select: other.select.clone(),
            filters,
        }
    }
}

impl CapturedExchange {
    /// The request's `queries` array, or empty when absent/malformed.
    pub fn queries(&self) -> &[Value] {
        self.request
            .get("queries")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The response's `results` array, or empty when absent/malformed.
    pub fn results(&self) -> &[Value] {
        self.response
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Parsed view of query `index`, or `None` when the index is out of
    /// range or the nested query structure is missing.
    pub fn query_view(&self, index: usize) -> Option<QueryView> {
        self.queries().get(index).and_then(parse_query_view)
    }

    /// Parsed view of the primary (index 0) query.
    ///
    /// An exchange batch is organized per-query at capture time, so the
    /// primary query is the one an exchange is keyed by.
    pub fn primary_view(&self) -> Option<QueryView> {
        self.query_view(0)
    }

    /// Resolve which query a result entry answers, returning the
    /// answering query's select list with the primary query's filters
    /// overlaid by the answering query's own.
    ///
    /// The backend tags each result with a `jobId` indexing into
    /// `queries`. A missing or non-numeric `jobId` resolves to 0. An
    /// out-of-range index also falls back to the primary query — the
    /// capture sessions this mirrors have always paired one result per
    /// query, so a fallback firing means query/result mismatch and is
    /// logged at `warn` level.
    pub fn resolve_answering_view(&self, entry: &Value) -> Option<QueryView> {
        let primary = self.primary_view()?;
        let index = job_index(entry);
        if index == 0 {
            return Some(primary);
        }
        match self.query_view(index) {
            Some(answering) => Some(primary.overlaid_with(&answering)),
            None => {
                tracing::warn!(
                    job_index = index,
                    queries = self.queries().len(),
                    "result jobId out of range; falling back to primary query"
                );
                Some(primary)
            }
        }
    }
}

/// Extract the job index from a result entry's `jobId` field.
///
/// Accepts a JSON number or a string of digits; anything else (including
/// an absent field) resolves to 0.
pub fn job_index(entry: &Value) -> usize {
    match entry.get("jobId") {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize).unwrap_or(0),
        Some(Value::String(s)) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

/// Parse one element of the `queries` array into a [`QueryView`].
///
/// Returns `None` when the `Query.Commands[0].SemanticQueryDataShapeCommand.Query`
/// nesting is absent. Missing `Select` or `Where` arrays yield an empty
/// view, not `None` — only the envelope itself is load-bearing.
pub fn parse_query_view(query: &Value) -> Option<QueryView> {
    let semantic = query
        .get("Query")?
        .get("Commands")?
        .get(0)?
        .get("SemanticQueryDataShapeCommand")?
        .get("Query")?;

    let select = semantic
        .get("Select")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("Name").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let mut filters = BTreeMap::new();
    if let Some(wheres) = semantic.get("Where").and_then(Value::as_array) {
        for clause in wheres {
            if let Some(condition) = clause.get("Condition") {
                collect_condition(condition, &mut filters);
            }
        }
    }

    Some(QueryView { select, filters })
}

/// Fold one `Condition` object into the flat filter map.
///
/// `In` conditions contribute every literal across their value groups;
/// `Comparison` (equality) conditions contribute a single-element set, so
/// both predicate forms normalize identically downstream.
fn collect_condition(condition: &Value, filters: &mut BTreeMap<String, BTreeSet<String>>) {
    if let Some(membership) = condition.get("In") {
        let Some(subject) = membership
            .get("Expressions")
            .and_then(|e| e.get(0))
            .and_then(column_property)
        else {
            return;
        };
        let entry = filters.entry(subject.to_owned()).or_default();
        if let Some(groups) = membership.get("Values").and_then(Value::as_array) {
            for group in groups.iter().filter_map(Value::as_array) {
                for item in group {
                    if let Some(raw) = item
                        .get("Literal")
                        .and_then(|l| l.get("Value"))
                        .and_then(Value::as_str)
                    {
                        entry.insert(strip_literal(raw));
                    }
                }
            }
        }
    } else if let Some(comparison) = condition.get("Comparison") {
        let Some(subject) = comparison.get("Left").and_then(column_property) else {
            return;
        };
        if let Some(raw) = comparison
            .get("Right")
            .and_then(|r| r.get("Literal"))
            .and_then(|l| l.get("Value"))
            .and_then(Value::as_str)
        {
            filters
                .entry(subject.to_owned())
                .or_default()
                .insert(strip_literal(raw));
        }
    }
}

fn column_property(expr: &Value) -> Option<&str> {
    expr.get("Column")?.get("Property")?.as_str()
}

/// Strip the backend's surrounding single quotes from a literal value
/// (`"'Rent'"` → `"Rent"`).
fn strip_literal(raw: &str) -> String {
    raw.trim_matches('\'').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query_with(select: &[&str], wheres: Value) -> Value {
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

    fn in_clause(subject: &str, values: &[&str]) -> Value {
        json!({
            "Condition": {
                "In": {
                    "Expressions": [{"Column": {"Property": subject}}],
                    "Values": [values.iter().map(|v| json!({"Literal": {"Value": format!("'{v}'")}})).collect::<Vec<_>>()],
                }
            }
        })
    }

    fn comparison_clause(subject: &str, value: &str) -> Value {
        json!({
            "Condition": {
                "Comparison": {
                    "Left": {"Column": {"Property": subject}},
                    "Right": {"Literal": {"Value": format!("'{value}'")}},
                }
            }
        })
    }

    fn exchange(queries: Vec<Value>, results: Vec<Value>) -> CapturedExchange {
        CapturedExchange {
            request: json!({"queries": queries}),
            response: json!({"results": results}),
        }
    }

    #[test]
    fn test_parse_select_and_in_filters() {
        let q = query_with(
            &["##Transaction Volume"],
            json!([in_clause("Transaction Type", &["Sales - Ready"])]),
        );
        let view = parse_query_view(&q).unwrap();
        assert_eq!(view.first_select(), Some("##Transaction Volume"));
        assert_eq!(view.filter_value("Transaction Type"), Some("Sales - Ready"));
    }

    #[test]
    fn test_comparison_folds_to_single_value_set() {
        let q = query_with(&["f"], json!([comparison_clause("Version", "New")]));
        let view = parse_query_view(&q).unwrap();
        assert_eq!(
            view.filters["Version"],
            BTreeSet::from(["New".to_owned()])
        );
    }

    #[test]
    fn test_comparison_and_single_valued_in_normalize_identically() {
        let a = parse_query_view(&query_with(&["f"], json!([in_clause("Version", &["New"])])))
            .unwrap();
        let b = parse_query_view(&query_with(&["f"], json!([comparison_clause("Version", "New")])))
            .unwrap();
        assert_eq!(a.filters, b.filters);
    }

    #[test]
    fn test_multi_group_in_values_are_merged() {
        let q = json!({
            "Query": {"Commands": [{"SemanticQueryDataShapeCommand": {"Query": {
                "Select": [{"Name": "f"}],
                "Where": [{
                    "Condition": {"In": {
                        "Expressions": [{"Column": {"Property": "Status"}}],
                        "Values": [
                            [{"Literal": {"Value": "'Existing'"}}],
                            [{"Literal": {"Value": "'Under Construction'"}}]
                        ],
                    }}
                }],
            }}}]}
        });
        let view = parse_query_view(&q).unwrap();
        assert_eq!(view.filters["Status"].len(), 2);
    }

    #[test]
    fn test_missing_envelope_is_none() {
        assert!(parse_query_view(&json!({})).is_none());
        assert!(parse_query_view(&json!({"Query": {"Commands": []}})).is_none());
    }

    #[test]
    fn test_missing_select_and_where_give_empty_view() {
        let q = json!({
            "Query": {"Commands": [{"SemanticQueryDataShapeCommand": {"Query": {}}}]}
        });
        let view = parse_query_view(&q).unwrap();
        assert!(view.select.is_empty());
        assert!(view.filters.is_empty());
    }

    #[test]
    fn test_malformed_exchange_accessors_are_empty() {
        let ex = CapturedExchange {
            request: json!({"not_queries": 1}),
            response: json!("scalar"),
        };
        assert!(ex.queries().is_empty());
        assert!(ex.results().is_empty());
        assert!(ex.primary_view().is_none());
    }

    // ---- jobId resolution ----

    #[test]
    fn test_job_index_string_and_number() {
        assert_eq!(job_index(&json!({"jobId": "2"})), 2);
        assert_eq!(job_index(&json!({"jobId": 3})), 3);
    }

    #[test]
    fn test_job_index_defaults_to_zero() {
        assert_eq!(job_index(&json!({})), 0);
        assert_eq!(job_index(&json!({"jobId": "abc"})), 0);
        assert_eq!(job_index(&json!({"jobId": ""})), 0);
        assert_eq!(job_index(&json!({"jobId": null})), 0);
        assert_eq!(job_index(&json!({"jobId": -1})), 0);
    }

    #[test]
    fn test_resolve_overlays_answering_filters() {
        let primary = query_with(
            &["a"],
            json!([in_clause("Transaction Type", &["Rent"]), in_clause("Keep", &["yes"])]),
        );
        let answering = query_with(&["b"], json!([in_clause("Transaction Type", &["Sales - Ready"])]));
        let ex = exchange(vec![primary, answering], vec![]);

        let view = ex.resolve_answering_view(&json!({"jobId": "1"})).unwrap();
        assert_eq!(view.first_select(), Some("b"));
        // Answering query wins on the shared subject; untouched subjects survive.
        assert_eq!(view.filter_value("Transaction Type"), Some("Sales - Ready"));
        assert_eq!(view.filter_value("Keep"), Some("yes"));
    }

    #[test]
    fn test_resolve_out_of_range_falls_back_to_primary() {
        let primary = query_with(&["a"], json!([in_clause("Version", &["New"])]));
        let ex = exchange(vec![primary, ], vec![]);
        let view = ex.resolve_answering_view(&json!({"jobId": "7"})).unwrap();
        assert_eq!(view.first_select(), Some("a"));
        assert_eq!(view.filter_value("Version"), Some("New"));
    }

    #[test]
    fn test_resolve_without_queries_is_none() {
        let ex = exchange(vec![], vec![]);
        assert!(ex.resolve_answering_view(&json!({"jobId": "0"})).is_none());
    }

    // ---- snapshot ----

    #[test]
    fn test_snapshot_roundtrip_preserves_unknown_fields() {
        let raw = json!({
            "01.06.2025": {
                "Business Bay": [{
                    "request": {"queries": [], "cacheKey": "opaque", "modelId": 42},
                    "response": {"results": [], "jobIds": ["x"]},
                }]
            }
        });
        let snapshot: Snapshot = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&snapshot).unwrap(), raw);
        assert_eq!(snapshot.exchange_count(), 1);
    }

    #[test]
    fn test_from_json_str() {
        assert!(Snapshot::from_json_str(r#"{"01.06.2025": {"Business Bay": []}}"#).is_ok());
        assert!(matches!(
            Snapshot::from_json_str("not json"),
            Err(crate::ReinsightError::SnapshotParse(_))
        ));
    }

    #[test]
    fn test_snapshot_pairs_iteration() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "d1": {"a1": [], "a2": []},
            "d2": {"a3": []},
        }))
        .unwrap();
        let pairs: Vec<_> = snapshot.pairs().map(|(d, a, _)| (d, a)).collect();
        assert_eq!(pairs, vec![("d1", "a1"), ("d1", "a2"), ("d2", "a3")]);
    }
}
