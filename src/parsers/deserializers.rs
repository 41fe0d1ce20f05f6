use chrono::{DateTime, NaiveDateTime};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
    Other(IgnoredAny),
}

/// Parse a textual timestamp into a tz-naive datetime.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS[.fff]]`, the same with a `T` separator, and RFC3339 (the
/// offset is dropped and local wall-clock time kept).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local()))
}

/// Custom deserializer for message timestamps.
///
/// Integers are read as Unix epoch milliseconds, strings via [`parse_timestamp`]. Missing,
/// null or unparseable values become `None` instead of failing the row, so enrichment can
/// report them with the row position.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTimestamp::Millis(ms)) => DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc()),
        Some(RawTimestamp::Text(s)) => parse_timestamp(&s),
        Some(RawTimestamp::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::Message;

    fn expected() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 11, 2).unwrap().and_hms_opt(9, 41, 20).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2023-11-02 09:41:20"), Some(expected()));
        assert_eq!(parse_timestamp("2023-11-02T09:41:20"), Some(expected()));
        assert_eq!(parse_timestamp("2023-11-02T09:41:20+02:00"), Some(expected()));
        assert_eq!(
            parse_timestamp("2023-11-02 09:41"),
            Some(expected().date().and_hms_opt(9, 41, 0).unwrap())
        );
        assert!(parse_timestamp("2023-11-02T09:41:20.016").is_some());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2023-13-02 09:41:20"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_message_timestamp_integer_millis() {
        let json = r#"{"author": "a", "timestamp": 1698918080000, "message": "hi"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.timestamp, Some(expected()));
    }

    #[test]
    fn test_message_timestamp_missing_or_invalid() {
        let missing: Message = serde_json::from_str(r#"{"author": "a", "message": "hi"}"#).unwrap();
        assert!(missing.timestamp.is_none());

        let invalid: Message =
            serde_json::from_str(r#"{"author": "a", "timestamp": "soon", "message": "hi"}"#)
                .unwrap();
        assert!(invalid.timestamp.is_none());

        let wrong_type: Message =
            serde_json::from_str(r#"{"author": "a", "timestamp": true, "message": "hi"}"#).unwrap();
        assert!(wrong_type.timestamp.is_none());
    }
}
