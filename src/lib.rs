//! # placemap
//!
//! Location-history ingestion and map-view derivation library.
//!
//! This library provides:
//! - Multi-schema ingestion (CSV, JSON arrays, GeoJSON, semantic segments)
//! - Normalization into one canonical point model with alias resolution
//! - Coordinate validation and timestamp enrichment
//! - Pure filtering and statistical aggregation
//! - Spatial clustering for map rendering with antimeridian wrap-around
//! - CSV/JSON export of the filtered set
//!
//! ## Quick Start
//!
//! ```rust
//! use placemap::{SourceFormat, TimelineEngine};
//!
//! let csv = "latitude,longitude,title\n40.7128,-74.0060,New York\n";
//!
//! let mut engine = TimelineEngine::new();
//! engine.import_str(csv, SourceFormat::Csv).unwrap();
//!
//! assert_eq!(engine.points().len(), 1);
//! assert_eq!(engine.points()[0].title, "New York");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Unified error handling
pub mod error;
pub use error::{ExportError, ImportError};

// Degree-bearing coordinate string decoding
pub mod coords;
pub use coords::parse_lat_lng;

// Lenient timestamp parsing and month formatting
pub mod time;
pub use time::{month_year, parse_timestamp};

// Format adapters, normalization and validation
pub mod ingest;
pub use ingest::{import_file, import_str, SourceFormat};

// Pure filter predicate over the canonical set
pub mod filter;
pub use filter::apply_filters;

// Statistical aggregation
pub mod stats;
pub use stats::{CategoryStats, MonthStats, Statistics};

// Marker generation, clustering and viewport framing
pub mod cluster;
pub use cluster::{
    framing_bounds, Cluster, ClusterRenderer, ClusterScene, ClusterTier, Marker, MarkerIcon,
    Viewport, WORLD_COPY_OFFSETS,
};

// Serialized export of the filtered set
pub mod export;
pub use export::{export_csv, export_json, export_to_file, ExportContext, ExportFormat};

// Canonical state holder fanning out the derived views
pub mod engine;
pub use engine::TimelineEngine;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate pair.
///
/// # Example
/// ```
/// use placemap::LatLng;
/// let p = LatLng::new(51.5074, -0.1278); // London
/// assert!(p.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    /// Create a new coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the coordinates are finite and within world range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Compute bounds covering a set of points. Returns `None` for an empty set.
    pub fn from_points(points: &[DataPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Expand each side by `factor` of the corresponding dimension.
    pub fn pad(&self, factor: f64) -> Self {
        let lat_buf = (self.max_lat - self.min_lat) * factor;
        let lng_buf = (self.max_lng - self.min_lng) * factor;
        Self {
            min_lat: self.min_lat - lat_buf,
            max_lat: self.max_lat + lat_buf,
            min_lng: self.min_lng - lng_buf,
            max_lng: self.max_lng + lng_buf,
        }
    }

    /// Check whether a coordinate lies inside the bounds (inclusive).
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lng
            && longitude <= self.max_lng
    }
}

/// The canonical normalized location record used by every downstream view.
///
/// Produced by the ingestion pipeline only; downstream consumers (filter,
/// aggregation, cluster rendering, export) never mutate it. Unrecognized
/// source fields are preserved in `extras` in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    /// Unique within the current batch (`point_<n>`, `<sourceKind>_<n>`,
    /// or taken from the source record).
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Non-empty; synthesized as `Point <n>` when the source has none.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source timestamp string, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Derived "MMM YYYY" label; absent when `timestamp` does not parse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<String>,
    /// Every unrecognized source field, insertion-ordered.
    #[serde(flatten)]
    pub extras: IndexMap<String, Value>,
}

impl DataPoint {
    /// Create a minimal point; optional fields empty.
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            title: title.into(),
            description: None,
            timestamp: None,
            month_year: None,
            category: None,
            visit_count: None,
            last_visit: None,
            extras: IndexMap::new(),
        }
    }

    /// Validator predicate: finite coordinates within world range.
    pub fn is_valid(&self) -> bool {
        LatLng::new(self.latitude, self.longitude).is_valid()
    }

    /// Visit count as consumed everywhere downstream (defaults to 1).
    pub fn visits(&self) -> u32 {
        self.visit_count.unwrap_or(1)
    }
}

/// Inclusive time window for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
}

/// The query object narrowing the canonical set.
///
/// `categories` semantics: `None` passes every category, while an explicit
/// empty list passes nothing (every toggle removed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_visit_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_visit_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Rendering mode flag, not a data filter.
    #[serde(default)]
    pub show_visit_frequency: bool,
}

/// A user-drawn polygon region.
///
/// Boundaries are authored by map interaction, never produced by the
/// ingestion pipeline; they live alongside the point set in the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub id: String,
    pub name: String,
    /// Ordered polygon ring.
    pub coordinates: Vec<LatLng>,
    pub color: String,
}
