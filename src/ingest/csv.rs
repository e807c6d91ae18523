//! CSV format adapter.
//!
//! Headers come from the first line; fields are comma-split, trimmed, and
//! stripped of quote characters. Rows are forgiving: a width mismatch or an
//! unparseable coordinate skips the row with a logged warning, and only total
//! row loss is an error.

use log::warn;
use serde_json::Value;

use super::normalize::{from_record, Record};
use crate::{DataPoint, ImportError};

pub(crate) fn parse_csv(text: &str) -> Result<Vec<DataPoint>, ImportError> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return Err(ImportError::malformed(
            "CSV file must have at least a header row and one data row",
        ));
    }

    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|h| h.trim().replace('"', ""))
        .collect();

    let mut points = Vec::new();

    for (row_index, line) in lines.iter().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let values: Vec<String> = line
            .split(',')
            .map(|v| v.trim().replace('"', ""))
            .collect();
        if values.len() != headers.len() {
            warn!(
                "Skipping row {row_index}: {} fields but {} headers",
                values.len(),
                headers.len()
            );
            continue;
        }

        let record: Record = headers
            .iter()
            .cloned()
            .zip(values.into_iter().map(Value::String))
            .collect();

        let point = from_record(
            record,
            &format!("point_{row_index}"),
            &format!("Point {row_index}"),
        );

        if !point.latitude.is_finite() || !point.longitude.is_finite() {
            warn!("Skipping row {row_index}: invalid coordinates");
            continue;
        }

        points.push(point);
    }

    if points.is_empty() {
        return Err(ImportError::NoValidPoints { kind: "CSV" });
    }

    Ok(points)
}
