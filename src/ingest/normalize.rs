//! Alias resolution and candidate normalization.
//!
//! Every adapter funnels its loosely-typed records through [`from_record`],
//! which applies one ordered alias table per canonical field:
//!
//! | canonical    | aliases, first defined wins          |
//! |--------------|--------------------------------------|
//! | id           | `id` (else adapter-synthesized)      |
//! | latitude     | `latitude`, `lat`                    |
//! | longitude    | `longitude`, `lng`, `lon`            |
//! | title        | `title`, `name` (else synthesized)   |
//! | description  | `description`, `desc`                |
//! | timestamp    | `timestamp`, `date`, `time`          |
//! | category     | `category`, `type`                   |
//! | visit count  | `visitCount`                         |
//! | last visit   | `lastVisit`                          |
//!
//! Unconsumed keys are copied verbatim into the extension map, except keys
//! that collide with canonical column names: the explicitly-resolved field
//! always wins over a same-named extension entry.

use indexmap::IndexMap;
use serde_json::Value;

use crate::{time, DataPoint};

/// A loosely-typed source record, insertion-ordered.
pub(crate) type Record = IndexMap<String, Value>;

/// Canonical column names; never duplicated into the extension map.
const CANONICAL_KEYS: &[&str] = &[
    "id",
    "latitude",
    "longitude",
    "title",
    "description",
    "timestamp",
    "monthYear",
    "category",
    "visitCount",
    "lastVisit",
];

/// Convert a source record into a canonical point.
///
/// `fallback_id` and `fallback_title` are used when the record carries no
/// usable `id`/`title` alias. Missing or unparseable coordinates come out as
/// NaN; the caller decides whether to skip (CSV rows) or leave them to the
/// validator (JSON candidates).
pub(crate) fn from_record(mut record: Record, fallback_id: &str, fallback_title: &str) -> DataPoint {
    let id = take_string(&mut record, &["id"]).unwrap_or_else(|| fallback_id.to_string());
    let latitude = take_f64(&mut record, &["latitude", "lat"]);
    let longitude = take_f64(&mut record, &["longitude", "lng", "lon"]);
    let title =
        take_string(&mut record, &["title", "name"]).unwrap_or_else(|| fallback_title.to_string());
    let description = take_string(&mut record, &["description", "desc"]);
    let timestamp = take_string(&mut record, &["timestamp", "date", "time"]);
    let category = take_string(&mut record, &["category", "type"]);
    let visit_count = take_u32(&mut record, &["visitCount"]);
    let last_visit = take_string(&mut record, &["lastVisit"]);

    let extras: Record = record
        .into_iter()
        .filter(|(key, _)| !CANONICAL_KEYS.contains(&key.as_str()))
        .collect();

    DataPoint {
        id,
        latitude,
        longitude,
        title,
        description,
        timestamp,
        month_year: None,
        category,
        visit_count,
        last_visit,
        extras,
    }
}

/// Derive `month_year` for every point whose timestamp parses.
///
/// Runs once, at creation time, on owned data; an unparseable timestamp
/// leaves the field unset without raising an error.
pub(crate) fn enrich(points: Vec<DataPoint>) -> Vec<DataPoint> {
    points
        .into_iter()
        .map(|mut point| {
            point.month_year = point
                .timestamp
                .as_deref()
                .and_then(time::parse_timestamp)
                .map(|dt| time::month_year(&dt));
            point
        })
        .collect()
}

/// A value counts as "defined" when it is non-null and, for strings,
/// non-empty. Undefined aliases fall through to the next one.
fn is_defined(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Remove and return the first defined alias, rendered as a string.
fn take_string(record: &mut Record, aliases: &[&str]) -> Option<String> {
    let key = aliases
        .iter()
        .find(|&&alias| record.get(alias).is_some_and(is_defined))?;
    let value = record.shift_remove(*key)?;
    Some(value_to_string(&value))
}

/// Remove the first defined alias and parse it as a float.
///
/// Returns NaN when no alias is defined or the value does not parse; "first
/// defined wins" means an unparseable first alias does not fall through.
fn take_f64(record: &mut Record, aliases: &[&str]) -> f64 {
    let Some(key) = aliases
        .iter()
        .find(|&&alias| record.get(alias).is_some_and(is_defined))
    else {
        return f64::NAN;
    };
    match record.shift_remove(*key) {
        Some(value) => value_to_f64(&value),
        None => f64::NAN,
    }
}

/// Remove the first defined alias and parse it as a non-negative count.
fn take_u32(record: &mut Record, aliases: &[&str]) -> Option<u32> {
    let key = aliases
        .iter()
        .find(|&&alias| record.get(alias).is_some_and(is_defined))?;
    let value = record.shift_remove(*key)?;
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a scalar source value as a string (objects/arrays keep their JSON
/// form so nothing is lost).
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Coerce a numeric or numeric-string value to a float, NaN otherwise.
pub(crate) fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}
