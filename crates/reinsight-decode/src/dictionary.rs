//! # Label Resolution — Hierarchy Lists and Value Dictionaries
//!
//! Series and category rows never carry their labels inline. A row's
//! sub-values are labeled positionally from one of two side structures on
//! the data section:
//!
//! - the hierarchy-label list at `SH[0].DM1[*].G1` (one label per series
//!   column), or
//! - a value dictionary at `ValueDicts.<name>` (indexed by a number
//!   stored in the row itself).
//!
//! When an index has no label — the list is shorter than the row, or the
//! dictionary is absent — the stringified index itself becomes the label,
//! so a decodable value is never thrown away over missing metadata.

use serde_json::Value;

/// Labels from the hierarchy list at `SH[0].DM1[*].G1`.
///
/// Missing structure yields an empty list; entries without a `G1` field
/// contribute an empty label (the list is positional, so skipping would
/// shift every later column).
pub fn hierarchy_labels(data_section: &Value) -> Vec<String> {
    data_section
        .get("SH")
        .and_then(|sh| sh.get(0))
        .and_then(|row| row.get("DM1"))
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|item| label_text(item.get("G1"))).collect())
        .unwrap_or_default()
}

/// Labels from the value dictionary `ValueDicts.<name>`.
pub fn value_dictionary(data_section: &Value, name: &str) -> Vec<String> {
    data_section
        .get("ValueDicts")
        .and_then(|dicts| dicts.get(name))
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|item| label_text(Some(item))).collect())
        .unwrap_or_default()
}

/// Resolve a positional index against a label list, falling back to the
/// stringified index.
pub fn resolve_label(labels: &[String], index: usize) -> String {
    match labels.get(index) {
        Some(label) => label.clone(),
        None => index.to_string(),
    }
}

fn label_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hierarchy_labels() {
        let ds = json!({"SH": [{"DM1": [{"G1": "Studio"}, {"G1": "1 Bedroom"}]}]});
        assert_eq!(hierarchy_labels(&ds), vec!["Studio", "1 Bedroom"]);
    }

    #[test]
    fn test_hierarchy_labels_missing_g1_keeps_position() {
        let ds = json!({"SH": [{"DM1": [{"G1": "Studio"}, {}, {"G1": "2 Bedrooms"}]}]});
        assert_eq!(hierarchy_labels(&ds), vec!["Studio", "", "2 Bedrooms"]);
    }

    #[test]
    fn test_hierarchy_labels_absent_structure() {
        assert!(hierarchy_labels(&json!({})).is_empty());
        assert!(hierarchy_labels(&json!({"SH": []})).is_empty());
        assert!(hierarchy_labels(&json!({"SH": [{"DM1": "not-an-array"}]})).is_empty());
    }

    #[test]
    fn test_value_dictionary() {
        let ds = json!({"ValueDicts": {"D0": ["Studio", "1 Bedroom"], "D1": ["x"]}});
        assert_eq!(value_dictionary(&ds, "D0"), vec!["Studio", "1 Bedroom"]);
        assert_eq!(value_dictionary(&ds, "D1"), vec!["x"]);
        assert!(value_dictionary(&ds, "D2").is_empty());
    }

    #[test]
    fn test_numeric_dictionary_entries_stringify() {
        let ds = json!({"ValueDicts": {"D0": [2023, 2024]}});
        assert_eq!(value_dictionary(&ds, "D0"), vec!["2023", "2024"]);
    }

    #[test]
    fn test_resolve_label_fallback() {
        let labels = vec!["Studio".to_owned()];
        assert_eq!(resolve_label(&labels, 0), "Studio");
        assert_eq!(resolve_label(&labels, 3), "3");
        assert_eq!(resolve_label(&[], 0), "0");
    }
}
