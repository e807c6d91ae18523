//! Error taxonomies for import and export.
//!
//! Import failures abort only the current attempt; the previously-loaded
//! canonical set stays untouched. Export failures are reported separately so
//! a failed export can never be mistaken for a failed import.

use thiserror::Error;

/// Errors surfaced while ingesting a location-history file.
///
/// All variants are recoverable: the caller keeps its current point set and
/// may retry with another file. Row-level problems (a bad CSV row, one
/// malformed coordinate string, an unparseable timestamp) are dropped or
/// defaulted during parsing and never reach this taxonomy; only total record
/// loss does.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file extension is neither `.csv` nor `.json`.
    #[error("Unsupported file format. Please upload CSV or JSON files.")]
    UnsupportedFormat { extension: String },

    /// The input is structurally unreadable (JSON syntax error, CSV missing
    /// a data row).
    #[error("{reason}")]
    MalformedInput { reason: String },

    /// Every record was rejected by numeric parsing or coordinate validation.
    ///
    /// The field is the source-format label ("CSV"/"JSON"), not a cause.
    #[error("No valid data points found in {kind} file")]
    NoValidPoints { kind: &'static str },

    /// Parsed JSON matches none of the recognized shapes.
    #[error("Invalid JSON format. Expected array of objects, GeoJSON, or semantic segments.")]
    InvalidFormat,

    /// The file could not be read at all.
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced while exporting the filtered set.
///
/// None of these corrupt the in-memory canonical or filtered sets, and the
/// empty check happens before any file is created.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The filtered set is empty; nothing was written.
    #[error("no data points match the current filters")]
    Empty,

    /// Serializing the export payload failed.
    #[error("failed to serialize export data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Encoding a CSV row failed.
    #[error("failed to encode CSV export: {0}")]
    Csv(#[from] csv::Error),

    /// Creating or writing the output file failed.
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}
