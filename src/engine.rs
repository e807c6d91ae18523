//! Canonical state holder fanning out the derived views.
//!
//! The engine owns the single source of truth: the canonical point batch,
//! the user-drawn boundaries and the active filter options. Ingestion is the
//! only writer and replaces the batch wholesale (replace-or-fail); every
//! derived view (filtered list, statistics, cluster scene, export) is
//! recomputed from scratch rather than patched incrementally.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::cluster::{ClusterRenderer, ClusterScene, Viewport};
use crate::export::{self, ExportContext, ExportFormat};
use crate::stats::Statistics;
use crate::{
    apply_filters, cluster, import_file, import_str, Boundary, Bounds, DataPoint, ExportError,
    FilterOptions, ImportError, SourceFormat,
};

/// In-memory application state: canonical points, boundaries, filters, and
/// the cluster renderer derived from them.
///
/// # Example
/// ```
/// use placemap::{SourceFormat, TimelineEngine};
///
/// let mut engine = TimelineEngine::new();
/// engine
///     .import_str("latitude,longitude,title\n51.5,-0.12,London\n", SourceFormat::Csv)
///     .unwrap();
/// assert_eq!(engine.filtered().len(), 1);
/// ```
#[derive(Default)]
pub struct TimelineEngine {
    points: Vec<DataPoint>,
    boundaries: Vec<Boundary>,
    filters: FilterOptions,
    renderer: ClusterRenderer,
}

impl TimelineEngine {
    /// Create an engine with no data loaded.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Ingestion (the single writer)
    // ========================================================================

    /// Import a file, replacing the canonical set wholesale on success.
    ///
    /// On any [`ImportError`] the previously-held set is left untouched.
    pub fn import_file(&mut self, path: &Path) -> Result<usize, ImportError> {
        let points = import_file(path)?;
        Ok(self.replace(points))
    }

    /// Import in-memory file text in the given format.
    pub fn import_str(&mut self, text: &str, format: SourceFormat) -> Result<usize, ImportError> {
        let points = import_str(text, format)?;
        Ok(self.replace(points))
    }

    fn replace(&mut self, points: Vec<DataPoint>) -> usize {
        info!("loaded {} points, replacing previous batch", points.len());
        self.points = points;
        self.renderer.mark_dirty();
        self.points.len()
    }

    /// Drop the canonical set. Boundaries are user-authored and survive.
    pub fn clear(&mut self) {
        self.points.clear();
        self.renderer.mark_dirty();
    }

    // ========================================================================
    // Inputs to the derived views
    // ========================================================================

    /// The canonical point set (always fully valid or empty).
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn has_data(&self) -> bool {
        !self.points.is_empty()
    }

    /// Replace the active filter options.
    pub fn set_filters(&mut self, filters: FilterOptions) {
        if self.filters != filters {
            self.filters = filters;
            self.renderer.mark_dirty();
        }
    }

    pub fn filters(&self) -> &FilterOptions {
        &self.filters
    }

    /// Distinct category values present in the canonical set, first-seen
    /// order (feeds the category filter toggles).
    pub fn available_categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for point in &self.points {
            if let Some(category) = &point.category {
                if !seen.contains(category) {
                    seen.push(category.clone());
                }
            }
        }
        seen
    }

    // ========================================================================
    // Derived views (read-only fan-out)
    // ========================================================================

    /// The filtered subset, recomputed on demand.
    pub fn filtered(&self) -> Vec<DataPoint> {
        apply_filters(&self.points, &self.filters)
    }

    /// Summary statistics over the filtered subset.
    pub fn statistics(&self) -> Statistics {
        Statistics::compute(&self.filtered())
    }

    /// Cluster scene for the given viewport, regenerating markers first if
    /// the point set or filters changed since the last scene.
    pub fn scene(&mut self, viewport: &Viewport) -> ClusterScene {
        if self.renderer.is_dirty() {
            let filtered = self.filtered();
            debug!("regenerating markers for {} filtered points", filtered.len());
            self.renderer.rebuild(&filtered, &self.filters);
        }
        self.renderer.scene(viewport)
    }

    /// Padded bounds framing the filtered set, `None` below two points.
    pub fn framing_bounds(&self) -> Option<Bounds> {
        cluster::framing_bounds(&self.filtered())
    }

    /// Export the filtered subset to a timestamped file in `dir`.
    ///
    /// Fails with [`ExportError::Empty`] before creating any file when the
    /// filtered set is empty; the in-memory sets are never touched.
    pub fn export_to_file(
        &self,
        dir: &Path,
        format: ExportFormat,
        with_metadata: bool,
    ) -> Result<PathBuf, ExportError> {
        let filtered = self.filtered();
        let context = with_metadata.then(|| ExportContext {
            filters: self.filters.clone(),
            total_points: self.points.len(),
        });
        export::export_to_file(dir, &filtered, format, context.as_ref())
    }

    // ========================================================================
    // Boundary management (user-authored, outside the ingestion pipeline)
    // ========================================================================

    /// Add a user-drawn boundary.
    pub fn add_boundary(&mut self, boundary: Boundary) {
        self.boundaries.push(boundary);
    }

    /// Rename a boundary. Returns false when the id is unknown.
    ///
    /// Edits apply to the single authoritative list, so consecutive rapid
    /// edits always compound.
    pub fn rename_boundary(&mut self, id: &str, name: impl Into<String>) -> bool {
        match self.boundaries.iter_mut().find(|b| b.id == id) {
            Some(boundary) => {
                boundary.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Remove a boundary by id. Returns the removed boundary if it existed.
    pub fn remove_boundary(&mut self, id: &str) -> Option<Boundary> {
        let index = self.boundaries.iter().position(|b| b.id == id)?;
        Some(self.boundaries.remove(index))
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }
}
