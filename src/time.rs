//! Lenient timestamp parsing and month formatting.
//!
//! Source files carry timestamps in whatever shape the exporting tool chose,
//! so parsing tries RFC 3339 first and falls back through the common
//! date/datetime layouts. An unparseable timestamp is simply `None`; it never
//! fails ingestion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Datetime layouts tried after RFC 3339, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts, interpreted as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse an ISO-ish timestamp string into UTC.
///
/// # Example
/// ```
/// use placemap::parse_timestamp;
///
/// assert!(parse_timestamp("2024-07-15T10:30:00Z").is_some());
/// assert!(parse_timestamp("2024-07-15").is_some());
/// assert!(parse_timestamp("not a date").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

/// Format a timestamp as the human-readable "MMM YYYY" month label.
///
/// # Example
/// ```
/// use placemap::{month_year, parse_timestamp};
///
/// let dt = parse_timestamp("2024-07-15T10:30:00Z").unwrap();
/// assert_eq!(month_year(&dt), "Jul 2024");
/// ```
pub fn month_year(dt: &DateTime<Utc>) -> String {
    dt.format("%b %Y").to_string()
}
