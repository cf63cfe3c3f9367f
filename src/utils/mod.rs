//! Utility functions and helpers.

pub mod http;
pub mod xml;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Convert a listing datetime (`YYYY-MM-DD HH:MM:SS`) to UTC ISO-8601 with a
/// trailing `Z`. Malformed input yields `None`.
pub fn xml_datetime_to_iso(input: &str) -> Option<String> {
    let parsed = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S").ok()?;
    Some(parsed.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Format a UTC timestamp as ISO-8601 with a trailing `Z`.
pub fn datetime_to_iso(datetime: DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an ISO-8601 timestamp (with `Z` or offset) into Unix seconds.
pub fn iso_to_timestamp(input: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_xml_datetime_to_iso() {
        assert_eq!(
            xml_datetime_to_iso("2020-01-02 03:04:05").as_deref(),
            Some("2020-01-02T03:04:05Z")
        );
    }

    #[test]
    fn test_xml_datetime_to_iso_malformed() {
        assert_eq!(xml_datetime_to_iso("2020-01-02"), None);
        assert_eq!(xml_datetime_to_iso("not a date"), None);
        assert_eq!(xml_datetime_to_iso(""), None);
    }

    #[test]
    fn test_datetime_to_iso() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(datetime_to_iso(dt), "2024-05-06T07:08:09Z");
    }

    #[test]
    fn test_iso_to_timestamp_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let iso = datetime_to_iso(dt);
        assert_eq!(iso_to_timestamp(&iso), Some(dt.timestamp()));
    }

    #[test]
    fn test_iso_to_timestamp_malformed() {
        assert_eq!(iso_to_timestamp("2024-05-06"), None);
    }
}
