//! JSON format adapters: generic record arrays and GeoJSON.
//!
//! A `.json` file is parsed once, then dispatched on shape: a bare array
//! becomes one candidate per element, a top-level `features` array is treated
//! as a GeoJSON FeatureCollection, and a `semanticSegments` array is handed
//! to the semantic-segments adapter. Anything else is `InvalidFormat`.

use serde_json::{Map, Value};

use super::normalize::{from_record, Record};
use super::segments;
use crate::{DataPoint, ImportError};

pub(crate) fn parse_json(text: &str) -> Result<Vec<DataPoint>, ImportError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ImportError::malformed(format!("Invalid JSON: {e}")))?;

    match value {
        Value::Array(items) => Ok(parse_array(items)),
        Value::Object(map) => {
            if let Some(Value::Array(features)) = map.get("features") {
                Ok(parse_geojson(features))
            } else if let Some(Value::Array(segs)) = map.get("semanticSegments") {
                Ok(segments::parse_segments(segs))
            } else {
                Err(ImportError::InvalidFormat)
            }
        }
        _ => Err(ImportError::InvalidFormat),
    }
}

/// Generic JSON array: one candidate per element, same alias resolution as
/// CSV but values may already be numeric. Non-object elements produce NaN
/// coordinates and fall to the validator.
fn parse_array(items: Vec<Value>) -> Vec<DataPoint> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let record = object_record(item);
            from_record(record, &format!("point_{index}"), &format!("Point {index}"))
        })
        .collect()
}

/// GeoJSON FeatureCollection: coordinates come from the geometry in
/// `[lng, lat]` axis order, everything else from `properties`.
fn parse_geojson(features: &[Value]) -> Vec<DataPoint> {
    features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let properties = feature
                .get("properties")
                .cloned()
                .map(object_record)
                .unwrap_or_default();

            let mut point = from_record(
                properties,
                &format!("point_{index}"),
                &format!("Point {index}"),
            );

            // Geometry always wins over same-named property entries.
            let coords = feature
                .get("geometry")
                .and_then(|g| g.get("coordinates"))
                .and_then(Value::as_array);
            point.longitude = coords
                .and_then(|c| c.first())
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            point.latitude = coords
                .and_then(|c| c.get(1))
                .and_then(Value::as_f64)
                .unwrap_or(0.0);

            // A top-level feature id outranks a properties id.
            if let Some(id) = feature.get("id") {
                match id {
                    Value::String(s) if !s.is_empty() => point.id = s.clone(),
                    Value::Number(n) => point.id = n.to_string(),
                    _ => {}
                }
            }

            point
        })
        .collect()
}

/// View a JSON value as an insertion-ordered record; non-objects yield an
/// empty record.
pub(crate) fn object_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map_to_record(map),
        _ => Record::new(),
    }
}

pub(crate) fn map_to_record(map: Map<String, Value>) -> Record {
    map.into_iter().collect()
}
