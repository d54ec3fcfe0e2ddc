//! UTC instant used for cycle and treatment dates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Reads a date as the records API writes it.
    ///
    /// Full RFC 3339 date-times are normalized to UTC. A bare `YYYY-MM-DD`
    /// is midnight UTC on that day. Blank or unrecognized input is `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        Some(Self(day.and_hms_opt(0, 0, 0)?.and_utc()))
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_datetime_is_normalized_to_utc() {
        let ts = Timestamp::parse_lenient("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-15T08:30:00+00:00");
    }

    #[test]
    fn bare_date_is_midnight() {
        let ts = Timestamp::parse_lenient(" 2024-03-01 ").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn unrecognized_input_is_none() {
        for raw in ["", "   ", "01/03/2024", "next tuesday"] {
            assert!(Timestamp::parse_lenient(raw).is_none(), "{:?}", raw);
        }
    }

    #[test]
    fn earlier_dates_sort_first() {
        let stim = Timestamp::parse_lenient("2024-01-01").unwrap();
        let opu = Timestamp::parse_lenient("2024-01-14T07:00:00Z").unwrap();
        assert!(stim < opu);
    }

    #[test]
    fn json_is_a_plain_string() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-01-15T10:30:00Z\"");
    }
}
