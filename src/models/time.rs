//! Wall-clock time handling for timeline payloads.
//!
//! The server exchanges local, zone-less timestamps (`2026-08-04T14:00:00`).
//! All domain records keep them as `chrono::NaiveDateTime` and round-trip
//! through this module's serde adapter.

use chrono::{NaiveDate, NaiveDateTime};

/// Wire format for local wall-clock timestamps.
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a local wall-clock timestamp string.
pub fn parse_local(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, LOCAL_DATETIME_FORMAT)
}

/// Format a timestamp back into the wire format.
pub fn format_local(dt: &NaiveDateTime) -> String {
    dt.format(LOCAL_DATETIME_FORMAT).to_string()
}

/// Calendar date of a local timestamp.
pub fn day_of(dt: &NaiveDateTime) -> NaiveDate {
    dt.date()
}

/// Serde adapter for `NaiveDateTime` fields using the local wire format.
///
/// Usage: `#[serde(with = "crate::models::time::serde_local")]`
pub mod serde_local {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::LOCAL_DATETIME_FORMAT;

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(LOCAL_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, LOCAL_DATETIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn parse_and_format_round_trip() {
        let dt = parse_local("2026-08-04T14:30:00").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2026, 8, 4).unwrap());
        assert_eq!(dt.hour(), 14);
        assert_eq!(format_local(&dt), "2026-08-04T14:30:00");
    }

    #[test]
    fn rejects_zoned_timestamps() {
        assert!(parse_local("2026-08-04T14:30:00Z").is_err());
    }

    #[test]
    fn serde_adapter_round_trips() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "super::serde_local")]
            at: chrono::NaiveDateTime,
        }

        let json = r#"{"at":"2026-08-04T09:00:00"}"#;
        let w: Wrapper = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&w).unwrap(), json);
    }
}
