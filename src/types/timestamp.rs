//! Timestamp parsing for observation feeds, and the display label derived from it.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Format of [`date_label`], e.g. `Mon-Jan-01`.
pub const DATE_LABEL_FORMAT: &str = "%a-%b-%d";

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

pub trait IntoUtcDateTime {
    fn into_utc(self) -> DateTime<Utc>;
}

impl IntoUtcDateTime for NaiveDateTime {
    fn into_utc(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self)
    }
}

impl IntoUtcDateTime for DateTime<FixedOffset> {
    fn into_utc(self) -> DateTime<Utc> {
        self.with_timezone(&Utc)
    }
}

impl IntoUtcDateTime for DateTime<Utc> {
    fn into_utc(self) -> DateTime<Utc> {
        self
    }
}

/// Parses an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339 (`2024-11-25T07:35:00Z`, `2024-11-24T21:35:00-10:00`) and
/// offset-less forms, which are taken to be UTC already.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.into_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(IntoUtcDateTime::into_utc)
}

/// Weekday-month-day label of the UTC date, used to group observations by day.
pub fn date_label(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DATE_LABEL_FORMAT).to_string()
}
