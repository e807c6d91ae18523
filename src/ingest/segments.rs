//! Semantic-segments adapter (nested travel-history exports).
//!
//! Each segment can contribute points from three independent sub-structures:
//! `timelinePath` entries, a `visit` place candidate, and `activity`
//! start/end locations. All coordinates arrive as `"<lat>°, <lng>°"` strings
//! and go through [`crate::coords::parse_lat_lng`]; a malformed string drops
//! that point only. Ids share one monotonically increasing counter across the
//! whole decode pass so they stay unique within the batch.

use serde_json::Value;

use super::json::object_record;
use super::normalize::Record;
use crate::coords::parse_lat_lng;
use crate::DataPoint;

pub(crate) fn parse_segments(segments: &[Value]) -> Vec<DataPoint> {
    let mut points = Vec::new();
    let mut counter = 0usize;

    for segment in segments {
        let start_time = string_field(segment, "startTime");
        let end_time = string_field(segment, "endTime");

        // 1. timelinePath entries, one point each
        if let Some(Value::Array(path)) = segment.get("timelinePath") {
            for entry in path {
                let Some((lat, lng)) = entry
                    .get("point")
                    .and_then(Value::as_str)
                    .and_then(parse_lat_lng)
                else {
                    continue;
                };

                let mut point = DataPoint::new(
                    format!("timelinePath_{counter}"),
                    lat,
                    lng,
                    "Timeline Path",
                );
                counter += 1;
                point.timestamp = string_field(entry, "time");
                point.extras = remaining_keys(entry.clone(), &["point", "time"]);
                points.push(point);
            }
        }

        // 2. visit.topCandidate.placeLocation.latLng, one point
        if let Some(candidate) = segment.get("visit").and_then(|v| v.get("topCandidate")) {
            let lat_lng = candidate
                .get("placeLocation")
                .and_then(|l| l.get("latLng"))
                .and_then(Value::as_str)
                .and_then(parse_lat_lng);

            if let Some((lat, lng)) = lat_lng {
                let title = candidate
                    .get("semanticType")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .unwrap_or("Visit")
                    .to_string();

                let mut point = DataPoint::new(format!("visit_{counter}"), lat, lng, title);
                counter += 1;
                point.timestamp = start_time.clone();
                point.extras = remaining_keys(candidate.clone(), &["placeLocation", "semanticType"]);
                points.push(point);
            }
        }

        // 3. activity.start.latLng / activity.end.latLng, independently
        if let Some(activity) = segment.get("activity") {
            let endpoints = [
                ("start", "activity_start", "Activity Start", &start_time),
                ("end", "activity_end", "Activity End", &end_time),
            ];
            for (key, id_prefix, title, timestamp) in endpoints {
                let Some(endpoint) = activity.get(key) else {
                    continue;
                };
                let Some((lat, lng)) = endpoint
                    .get("latLng")
                    .and_then(Value::as_str)
                    .and_then(parse_lat_lng)
                else {
                    continue;
                };

                let mut point = DataPoint::new(format!("{id_prefix}_{counter}"), lat, lng, title);
                counter += 1;
                point.timestamp = timestamp.clone();
                point.extras = remaining_keys(endpoint.clone(), &["latLng"]);
                points.push(point);
            }
        }
    }

    points
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

/// Extension map for a produced point: the sub-structure's keys minus the
/// ones consumed for coordinates, title, and timestamp.
fn remaining_keys(value: Value, consumed: &[&str]) -> Record {
    let mut record = object_record(value);
    record.retain(|key, _| !consumed.contains(&key.as_str()));
    record
}
