//! Lenient timestamp parsing for backend records.
//!
//! The backend renders Postgres timestamps with `to_string()`, so values
//! arrive either as RFC 3339 (`2024-03-01T10:00:00Z`), as a naive
//! `2024-03-01 10:00:00.123456`, or with a trailing ` UTC`. Naive values are
//! taken to be UTC. Everything is written back out as RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::TimestampError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub fn parse(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = s.strip_suffix(" UTC").unwrap_or(s);
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Ok(dt.and_utc());
        }
    }

    Err(TimestampError::Format(s.to_string()))
}

/// `#[serde(with = "timestamp::option")]` for `Option<DateTime<Utc>>` fields.
///
/// `null`, a missing field, or an empty string all decode to `None`.
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse("2024-03-01T10:15:30+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 15);
    }

    #[test]
    fn test_parse_postgres_naive() {
        let dt = parse("2024-03-01 10:15:30.123456").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_utc_suffix() {
        let dt = parse("2024-03-01 10:15:30.5 UTC").unwrap();
        assert_eq!(dt.second(), 30);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse("   "), Err(TimestampError::Empty));
        assert!(matches!(parse("yesterday"), Err(TimestampError::Format(_))));
    }
}
