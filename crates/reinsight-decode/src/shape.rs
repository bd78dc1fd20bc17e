//! # Result-Shape Decoding
//!
//! A result entry nests its rows at `result.data.dsr.DS[0].PH[0]`, under
//! keys starting `DM`. Three row shapes occur:
//!
//! - **Scalar**: `[{"M0": 42.0}]` — one measure in a flat row.
//! - **Series**: `[{"G0": <period>, "X": [{"M0": v}, …]}]` — a grouping
//!   value per row and one sub-value per category column.
//! - **Category**: `[{"C": [key, value]}]` — label/value pairs, the label
//!   either literal or an index into the `D0` value dictionary.
//!
//! The decoder is deliberately forgiving: any missing level short-circuits
//! to `None` for that entry, rows that do not match the expected shape are
//! skipped, and a series that decodes to nothing yields `None` so the
//! caller leaves the slot unset rather than writing an empty map. When a
//! payload carries several `DM` groups the last one that decodes wins,
//! matching the write order of the capture sessions.

use std::collections::BTreeMap;

use reinsight_core::{month_key, year_key};
use serde_json::{Map, Value};

use crate::classify::{IndicatorSlot, ShapeKind};
use crate::dictionary::{hierarchy_labels, resolve_label, value_dictionary};

/// A decoded result value, shaped per the indicator slot it fills.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// One measure.
    Scalar(f64),
    /// Label → value.
    Categories(BTreeMap<String, f64>),
    /// Period key → (label → value).
    Series(BTreeMap<String, BTreeMap<String, f64>>),
}

/// Decode a result entry according to the slot's row shape.
pub fn decode(entry: &Value, slot: IndicatorSlot) -> Option<DecodedValue> {
    let data_section = entry
        .get("result")?
        .get("data")?
        .get("dsr")?
        .get("DS")?
        .get(0)?;

    let mut decoded = None;
    for rows in row_groups(data_section) {
        let candidate = match slot.shape() {
            ShapeKind::Scalar => decode_scalar(rows).map(DecodedValue::Scalar),
            ShapeKind::MonthSeries => {
                decode_series(data_section, rows, PeriodKind::Month, false)
            }
            ShapeKind::YearSeries => decode_series(data_section, rows, PeriodKind::Year, false),
            ShapeKind::YearSeriesIndexed => {
                decode_series(data_section, rows, PeriodKind::Year, true)
            }
            ShapeKind::LiteralCategories => decode_categories(data_section, rows, false),
            ShapeKind::DictCategories => decode_categories(data_section, rows, true),
        };
        if candidate.is_some() {
            decoded = candidate;
        }
    }
    decoded
}

/// The `DM`-keyed row arrays under `PH[0]`, in key order.
fn row_groups(data_section: &Value) -> Vec<&Vec<Value>> {
    let Some(page) = data_section
        .get("PH")
        .and_then(|ph| ph.get(0))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };
    page.iter()
        .filter(|(key, _)| key.starts_with("DM"))
        .filter_map(|(_, rows)| rows.as_array())
        .collect()
}

#[derive(Clone, Copy)]
enum PeriodKind {
    Month,
    Year,
}

/// Scalar shape: the last row carrying a measure wins.
fn decode_scalar(rows: &[Value]) -> Option<f64> {
    let mut value = None;
    for row in rows.iter().filter_map(Value::as_object) {
        if let Some(v) = scalar_measure(row) {
            value = Some(v);
        }
    }
    value
}

/// The measure of a flat row: the first field whose key starts with `M`,
/// or failing that the first field with a numeric value.
fn scalar_measure(row: &Map<String, Value>) -> Option<f64> {
    for (key, value) in row {
        if key.starts_with('M') {
            if let Some(v) = numeric(value) {
                return Some(v);
            }
        } else if value.is_number() {
            return value.as_f64();
        }
    }
    None
}

/// Series shape: one period per row, one labeled value per `X` item.
fn decode_series(
    data_section: &Value,
    rows: &[Value],
    period: PeriodKind,
    indexed: bool,
) -> Option<DecodedValue> {
    let labels = hierarchy_labels(data_section);
    let mut series: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

    for row in rows.iter().filter_map(Value::as_object) {
        let Some(grouping) = row.get("G0") else {
            continue;
        };
        let Some(period_key) = (match period {
            PeriodKind::Month => month_key(grouping),
            PeriodKind::Year => year_key(grouping),
        }) else {
            continue;
        };
        let Some(items) = row.get("X").and_then(Value::as_array) else {
            continue;
        };

        let mut values = BTreeMap::new();
        for (position, item) in items.iter().filter_map(|i| i.as_object()).enumerate() {
            let index = if indexed {
                item.get("I")
                    .and_then(Value::as_u64)
                    .map(|i| i as usize)
                    .unwrap_or(position)
            } else {
                position
            };
            if let Some(value) = measure_field(item) {
                values.insert(resolve_label(&labels, index), value);
            }
        }
        if !values.is_empty() {
            series.insert(period_key, values);
        }
    }

    (!series.is_empty()).then_some(DecodedValue::Series(series))
}

/// The first `M`-prefixed field of a series item.
fn measure_field(item: &Map<String, Value>) -> Option<f64> {
    item.iter()
        .find(|(key, _)| key.starts_with('M'))
        .and_then(|(_, value)| numeric(value))
}

/// Category shape: `C` pairs of (label-or-index, value).
fn decode_categories(
    data_section: &Value,
    rows: &[Value],
    dict_backed: bool,
) -> Option<DecodedValue> {
    let labels = if dict_backed {
        value_dictionary(data_section, "D0")
    } else {
        Vec::new()
    };
    let mut categories = BTreeMap::new();

    for row in rows.iter().filter_map(Value::as_object) {
        // Period-grouped rows are a different shape, not category data.
        if row.contains_key("G0") {
            continue;
        }
        let Some(pair) = row.get("C").and_then(Value::as_array) else {
            continue;
        };
        if pair.len() < 2 {
            continue;
        }
        let Some(value) = numeric(&pair[1]) else {
            continue;
        };
        let label = if dict_backed {
            match pair[0].as_u64() {
                Some(index) => resolve_label(&labels, index as usize),
                None => literal_label(&pair[0]),
            }
        } else {
            literal_label(&pair[0])
        };
        if let Some(label) = label_or_skip(label) {
            categories.insert(label, value);
        }
    }

    (!categories.is_empty()).then_some(DecodedValue::Categories(categories))
}

fn literal_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn label_or_skip(label: String) -> Option<String> {
    (!label.is_empty()).then_some(label)
}

/// Numeric coercion: JSON numbers directly, numeric strings parsed.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
