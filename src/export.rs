//! Serialized export of the filtered point set.
//!
//! CSV headers are the fixed canonical columns followed by every distinct
//! extension key observed across the exported rows, in first-seen order.
//! JSON is either the bare array or a metadata envelope. Export always
//! operates on the already-filtered set and refuses an empty one before any
//! file is created.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, WriterBuilder};
use indexmap::IndexSet;
use log::debug;
use serde::Serialize;

use crate::ingest::normalize::value_to_string;
use crate::{DataPoint, ExportError, FilterOptions};

/// Fixed canonical CSV columns, in declared order.
const CANONICAL_COLUMNS: &[&str] = &[
    "id",
    "latitude",
    "longitude",
    "title",
    "description",
    "category",
    "timestamp",
    "visitCount",
    "lastVisit",
    "monthYear",
];

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Context for the JSON metadata envelope: the active filters and the size
/// of the unfiltered canonical set.
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub filters: FilterOptions,
    pub total_points: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportMetadata<'a> {
    export_date: String,
    total_points: usize,
    filters: &'a FilterOptions,
    original_data_points: usize,
}

#[derive(Serialize)]
struct Envelope<'a> {
    metadata: ExportMetadata<'a>,
    data: &'a [DataPoint],
}

/// Serialize a point list to CSV.
///
/// Values containing a comma or double quote are wrapped in quotes with
/// internal quotes doubled; missing values render as the empty string.
pub fn export_csv(points: &[DataPoint]) -> Result<String, ExportError> {
    if points.is_empty() {
        return Err(ExportError::Empty);
    }

    // Extension columns in first-seen order across all rows.
    let mut extra_columns: IndexSet<&str> = IndexSet::new();
    for point in points {
        for key in point.extras.keys() {
            if !CANONICAL_COLUMNS.contains(&key.as_str()) {
                extra_columns.insert(key.as_str());
            }
        }
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    let header: Vec<&str> = CANONICAL_COLUMNS
        .iter()
        .copied()
        .chain(extra_columns.iter().copied())
        .collect();
    writer.write_record(&header)?;

    for point in points {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.push(point.id.clone());
        row.push(point.latitude.to_string());
        row.push(point.longitude.to_string());
        row.push(point.title.clone());
        row.push(point.description.clone().unwrap_or_default());
        row.push(point.category.clone().unwrap_or_default());
        row.push(point.timestamp.clone().unwrap_or_default());
        row.push(point.visit_count.map(|v| v.to_string()).unwrap_or_default());
        row.push(point.last_visit.clone().unwrap_or_default());
        row.push(point.month_year.clone().unwrap_or_default());
        for column in &extra_columns {
            row.push(
                point
                    .extras
                    .get(*column)
                    .map(value_to_string)
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Serialize a point list to JSON.
///
/// With a context, the output is an envelope carrying an export timestamp,
/// the active filter options and filtered/total counts; without one it is the
/// bare array.
pub fn export_json(points: &[DataPoint], context: Option<&ExportContext>) -> Result<String, ExportError> {
    export_json_at(points, context, Utc::now())
}

/// Serialize to JSON with an explicit export timestamp.
pub fn export_json_at(
    points: &[DataPoint],
    context: Option<&ExportContext>,
    now: DateTime<Utc>,
) -> Result<String, ExportError> {
    if points.is_empty() {
        return Err(ExportError::Empty);
    }

    let text = match context {
        Some(ctx) => serde_json::to_string_pretty(&Envelope {
            metadata: ExportMetadata {
                export_date: now.to_rfc3339(),
                total_points: points.len(),
                filters: &ctx.filters,
                original_data_points: ctx.total_points,
            },
            data: points,
        })?,
        None => serde_json::to_string_pretty(points)?,
    };
    Ok(text)
}

/// Export a point list to `timeline_data_<date>.{csv,json}` in `dir`.
///
/// The serialized payload is produced in full before the file is created, so
/// a failed export never leaves a partial file behind.
pub fn export_to_file(
    dir: &Path,
    points: &[DataPoint],
    format: ExportFormat,
    context: Option<&ExportContext>,
) -> Result<PathBuf, ExportError> {
    let now = Utc::now();
    let content = match format {
        ExportFormat::Csv => export_csv(points)?,
        ExportFormat::Json => export_json_at(points, context, now)?,
    };

    let filename = format!(
        "timeline_data_{}.{}",
        now.format("%Y-%m-%d"),
        format.extension()
    );
    let path = dir.join(filename);
    fs::write(&path, content)?;

    debug!("exported {} points to {}", points.len(), path.display());
    Ok(path)
}
