//! Ingestion pipeline: format adapters, normalization, validation.
//!
//! Raw file text flows through a format adapter (selected by extension, not
//! content sniffing), then alias-resolving normalization, then the coordinate
//! validator, then one-shot enrichment. The output is either a fully valid
//! point batch or an [`ImportError`]; no partially-validated batch ever
//! escapes this module.

mod csv;
mod json;
pub(crate) mod normalize;
mod segments;

use std::fs;
use std::path::Path;

use log::debug;

use crate::{DataPoint, ImportError};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// Select a format from a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Source label used in user-facing messages.
    fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
        }
    }
}

/// Read and ingest a location-history file, dispatching on its extension.
///
/// An unrecognized extension fails immediately with
/// [`ImportError::UnsupportedFormat`] before any I/O happens.
pub fn import_file(path: &Path) -> Result<Vec<DataPoint>, ImportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let format = SourceFormat::from_extension(&extension)
        .ok_or(ImportError::UnsupportedFormat { extension })?;

    let text = fs::read_to_string(path)?;
    import_str(&text, format)
}

/// Ingest in-memory file text in the given format.
///
/// # Example
/// ```
/// use placemap::{import_str, SourceFormat};
///
/// let json = r#"[{"latitude": 40.7128, "longitude": -74.006, "title": "New York"}]"#;
/// let points = import_str(json, SourceFormat::Json).unwrap();
/// assert_eq!(points[0].id, "point_0");
/// ```
pub fn import_str(text: &str, format: SourceFormat) -> Result<Vec<DataPoint>, ImportError> {
    let candidates = match format {
        SourceFormat::Csv => csv::parse_csv(text)?,
        SourceFormat::Json => json::parse_json(text)?,
    };
    let candidate_count = candidates.len();

    // Validation gate: runs uniformly after every adapter.
    let valid: Vec<DataPoint> = candidates.into_iter().filter(DataPoint::is_valid).collect();
    if valid.is_empty() {
        return Err(ImportError::NoValidPoints {
            kind: format.label(),
        });
    }

    debug!(
        "ingested {} of {} candidate points from {}",
        valid.len(),
        candidate_count,
        format.label()
    );

    Ok(normalize::enrich(valid))
}
