//! Provenance stamping for entry files.
//!
//! Every stored entry carries three synthetic timestamps next to the API
//! fields:
//!
//! - **`+@date-added`**: when the entry appeared in the encyclopedia; set on
//!   first write and never changed afterwards.
//! - **`+@date-last-modified-at`**: when a content change was last detected.
//! - **`+@date-last-updated-at`**: when the entry was last written, changed
//!   or not ("we checked this").
//!
//! Content comparison excludes the provenance keys themselves and is
//! insensitive to key order, matching the `jq --sort-keys` diff the stored
//! files were historically maintained with.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::ReportItem;
use crate::utils::datetime_to_iso;

pub const DATE_ADDED: &str = "+@date-added";
pub const DATE_LAST_MODIFIED_AT: &str = "+@date-last-modified-at";
pub const DATE_LAST_UPDATED_AT: &str = "+@date-last-updated-at";
pub const GENERATED_ON: &str = "+@generated-on";

/// Keys excluded from content comparison.
pub const IGNORED_KEYS: [&str; 4] = [
    GENERATED_ON,
    DATE_ADDED,
    DATE_LAST_MODIFIED_AT,
    DATE_LAST_UPDATED_AT,
];

/// Whether two entries differ once the ignored top-level keys are removed.
pub fn contents_differ(a: &Value, b: &Value, ignore_keys: &[&str]) -> bool {
    strip_keys(a, ignore_keys) != strip_keys(b, ignore_keys)
}

fn strip_keys(value: &Value, keys: &[&str]) -> Value {
    let mut stripped = value.clone();
    if let Some(map) = stripped.as_object_mut() {
        for key in keys {
            map.remove(*key);
        }
    }
    stripped
}

/// Stamp the provenance fields onto a freshly-fetched entry.
///
/// `previous` is the on-disk version being replaced, when one exists. The
/// provenance keys are appended in a fixed order at the end of the object.
/// Returns whether the content changed (a fresh entry always counts as
/// changed).
pub fn stamp(
    entry: &mut Value,
    item: &ReportItem,
    previous: Option<&Value>,
    now: DateTime<Utc>,
) -> bool {
    let changed = match previous {
        Some(prev) => contents_differ(prev, entry, &IGNORED_KEYS),
        None => true,
    };

    let Some(map) = entry.as_object_mut() else {
        return changed;
    };
    let now_iso = datetime_to_iso(now);

    // The previously stored date-added wins; a first write takes the
    // originating report item's value.
    let date_added = previous
        .and_then(|prev| prev.get(DATE_ADDED))
        .cloned()
        .unwrap_or_else(|| match &item.date_added {
            Some(date) => Value::String(date.clone()),
            None => Value::Null,
        });
    map.insert(DATE_ADDED.to_string(), date_added);

    if changed {
        map.insert(
            DATE_LAST_MODIFIED_AT.to_string(),
            Value::String(now_iso.clone()),
        );
    } else if let Some(prev_modified) = previous.and_then(|prev| prev.get(DATE_LAST_MODIFIED_AT)) {
        map.insert(DATE_LAST_MODIFIED_AT.to_string(), prev_modified.clone());
    }

    map.insert(DATE_LAST_UPDATED_AT.to_string(), Value::String(now_iso));

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn item() -> ReportItem {
        ReportItem {
            id: "30".to_string(),
            name: Some("Trigun".to_string()),
            date_added: Some("1998-04-01T12:00:00Z".to_string()),
            search: None,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_entry_gets_equal_timestamps() {
        let mut entry = json!({"+@id": "30", "+@name": "Trigun"});
        let changed = stamp(&mut entry, &item(), None, at(9));

        assert!(changed);
        assert_eq!(entry[DATE_ADDED], "1998-04-01T12:00:00Z");
        assert_eq!(entry[DATE_LAST_MODIFIED_AT], "2024-05-06T09:00:00Z");
        assert_eq!(entry[DATE_LAST_UPDATED_AT], "2024-05-06T09:00:00Z");
    }

    #[test]
    fn test_fresh_entry_without_report_date() {
        let mut report_item = item();
        report_item.date_added = None;

        let mut entry = json!({"+@id": "30"});
        stamp(&mut entry, &report_item, None, at(9));
        assert_eq!(entry[DATE_ADDED], Value::Null);
    }

    #[test]
    fn test_unchanged_rewrite_preserves_added_and_modified() {
        let mut first = json!({"+@id": "30", "+@name": "Trigun"});
        stamp(&mut first, &item(), None, at(9));

        let mut second = json!({"+@id": "30", "+@name": "Trigun"});
        let changed = stamp(&mut second, &item(), Some(&first), at(10));

        assert!(!changed);
        assert_eq!(second[DATE_ADDED], first[DATE_ADDED]);
        assert_eq!(second[DATE_LAST_MODIFIED_AT], "2024-05-06T09:00:00Z");
        assert_eq!(second[DATE_LAST_UPDATED_AT], "2024-05-06T10:00:00Z");
    }

    #[test]
    fn test_changed_rewrite_bumps_modified_to_updated() {
        let mut first = json!({"+@id": "30", "+@name": "Trigun"});
        stamp(&mut first, &item(), None, at(9));

        let mut second = json!({"+@id": "30", "+@name": "Trigun Stampede"});
        let changed = stamp(&mut second, &item(), Some(&first), at(10));

        assert!(changed);
        assert_eq!(second[DATE_LAST_MODIFIED_AT], "2024-05-06T10:00:00Z");
        assert_eq!(second[DATE_LAST_MODIFIED_AT], second[DATE_LAST_UPDATED_AT]);
    }

    #[test]
    fn test_date_added_survives_a_changed_report_value() {
        let mut first = json!({"+@id": "30"});
        stamp(&mut first, &item(), None, at(9));

        let mut drifted = item();
        drifted.date_added = Some("2000-01-01T00:00:00Z".to_string());

        let mut second = json!({"+@id": "30"});
        stamp(&mut second, &drifted, Some(&first), at(10));
        assert_eq!(second[DATE_ADDED], "1998-04-01T12:00:00Z");
    }

    #[test]
    fn test_contents_differ_ignores_provenance_keys() {
        let a = json!({"+@id": "30", DATE_LAST_UPDATED_AT: "2024-01-01T00:00:00Z"});
        let b = json!({"+@id": "30", DATE_LAST_UPDATED_AT: "2024-02-02T00:00:00Z"});
        assert!(!contents_differ(&a, &b, &IGNORED_KEYS));
    }

    #[test]
    fn test_contents_differ_ignores_key_order() {
        let a: Value = serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"y": 2, "x": 1}"#).unwrap();
        assert!(!contents_differ(&a, &b, &IGNORED_KEYS));
    }

    #[test]
    fn test_contents_differ_detects_nested_change() {
        let a = json!({"info": [{"+content": "action"}]});
        let b = json!({"info": [{"+content": "comedy"}]});
        assert!(contents_differ(&a, &b, &IGNORED_KEYS));
    }

    #[test]
    fn test_provenance_keys_append_at_end() {
        let mut entry = json!({"+@id": "30", "+@name": "Trigun"});
        stamp(&mut entry, &item(), None, at(9));

        let keys: Vec<&str> = entry.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            &keys[keys.len() - 3..],
            &[DATE_ADDED, DATE_LAST_MODIFIED_AT, DATE_LAST_UPDATED_AT]
        );
    }
}
