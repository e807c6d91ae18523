//! Marker generation and on-screen clustering for map rendering.
//!
//! For every point the renderer materializes three marker records at
//! longitude offsets of -360, 0 and +360 degrees, tagged with the source
//! point's id, so horizontal panning never shows a gap at the ±180° seam and
//! a stale batch's markers can be removed exactly. Markers live in an R-tree
//! keyed by their (possibly shifted) coordinates; each viewport query pulls
//! the relevant ones and groups them greedily by on-screen pixel proximity.
//!
//! Scenes carry a monotonically increasing generation so that when triggers
//! arrive faster than recomputation completes, consumers keep only the newest
//! result (last-write-wins).

use chrono::{DateTime, Utc};
use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;

use crate::{time, Bounds, DataPoint, FilterOptions, LatLng};

/// Longitude offsets for antimeridian wrap duplication.
pub const WORLD_COPY_OFFSETS: [f64; 3] = [-360.0, 0.0, 360.0];

/// On-screen cluster radius in pixels.
const CLUSTER_RADIUS_PX: f64 = 50.0;

/// Web Mercator world tile size at zoom 0.
const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator projection.
const MAX_MERCATOR_LAT: f64 = 85.05112878;

/// Padding factor applied when re-framing the view around a batch.
const FRAME_PADDING: f64 = 0.1;

/// Marker diameter bounds in visit-frequency mode.
const MIN_MARKER_SIZE: u32 = 8;
const MAX_MARKER_SIZE: u32 = 20;
const BASE_MARKER_SIZE: u32 = 12;
const BASE_BORDER_PX: u32 = 2;

/// Base marker color per category; unrecognized or absent categories use
/// [`DEFAULT_COLOR`].
const CATEGORY_PALETTE: &[(&str, &str)] = &[
    ("restaurant", "#ff6b6b"),
    ("hotel", "#4ecdc4"),
    ("attraction", "#45b7d1"),
    ("shop", "#96ceb4"),
    ("transport", "#feca57"),
];
const DEFAULT_COLOR: &str = "#6c5ce7";

/// Synthesized appearance of a single marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    pub color: String,
    pub size_px: u32,
    pub border_px: u32,
    /// Visit-count badge, shown in frequency mode for repeat visits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
}

impl MarkerIcon {
    /// Build the icon for a point.
    ///
    /// Base appearance is keyed by category. In visit-frequency mode the
    /// diameter scales with the visit count (clamped), the color escalates
    /// through three visit thresholds, and the border thickens with recency
    /// of the last visit (`now` anchors the recency tiers).
    pub fn for_point(point: &DataPoint, frequency_mode: bool, now: DateTime<Utc>) -> Self {
        let mut color = category_color(point.category.as_deref()).to_string();
        let mut size_px = BASE_MARKER_SIZE;
        let mut border_px = BASE_BORDER_PX;
        let mut badge = None;

        if frequency_mode {
            let visits = point.visits();
            size_px = MIN_MARKER_SIZE
                .saturating_add(visits.saturating_mul(2))
                .clamp(MIN_MARKER_SIZE, MAX_MARKER_SIZE);

            if visits > 5 {
                color = "#ff4757".to_string();
            } else if visits > 3 {
                color = "#ff6b6b".to_string();
            } else if visits > 1 {
                color = "#ffa502".to_string();
            }

            if let Some(last) = point.last_visit.as_deref().and_then(time::parse_timestamp) {
                let days_since = (now - last).num_days();
                if days_since < 7 {
                    border_px = 4;
                } else if days_since < 30 {
                    border_px = 3;
                }
            }

            if visits > 1 {
                badge = Some(visits);
            }
        }

        Self {
            color,
            size_px,
            border_px,
            badge,
        }
    }
}

fn category_color(category: Option<&str>) -> &'static str {
    let Some(category) = category else {
        return DEFAULT_COLOR;
    };
    let lowered = category.to_ascii_lowercase();
    CATEGORY_PALETTE
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// One renderable marker instance (a point or one of its world copies).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Id of the originating point.
    pub point_id: String,
    pub position: LatLng,
    /// World copy index: -1, 0 or +1; 0 is the non-duplicated marker.
    pub world_copy: i8,
    pub icon: MarkerIcon,
}

/// Cluster icon size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterTier {
    Small,
    Medium,
    Large,
}

impl ClusterTier {
    /// Tier for a contained marker count: `<10`, `<100`, `≥100`.
    pub fn for_count(count: usize) -> Self {
        if count < 10 {
            Self::Small
        } else if count < 100 {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// An on-screen grouping of nearby markers collapsed into one badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub position: LatLng,
    pub count: usize,
    pub tier: ClusterTier,
    /// Originating point ids of the contained markers.
    pub point_ids: Vec<String>,
}

/// The clustered rendering of one viewport query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterScene {
    pub clusters: Vec<Cluster>,
    /// Markers that did not join any cluster.
    pub markers: Vec<Marker>,
    /// Monotonically increasing; consumers drop scenes older than the newest
    /// one they have seen.
    pub generation: u64,
}

/// Visible map region plus zoom level.
///
/// Longitudes may exceed ±180 while panning across the antimeridian; world
/// copy markers are placed in the same extended coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bounds: Bounds,
    pub zoom: f64,
}

/// R-tree entry: marker arena index at its shifted coordinates.
struct MarkerEntry {
    index: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for MarkerEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lng, self.lat])
    }
}

/// Groups markers into on-screen clusters for the current viewport.
///
/// The marker arena is regenerated from the filtered point set whenever the
/// canonical set or the filter options change; `mark_dirty` plus a rebuild on
/// the next use keeps recomputation cheap and idempotent.
#[derive(Default)]
pub struct ClusterRenderer {
    markers: Vec<Marker>,
    tree: RTree<MarkerEntry>,
    dirty: bool,
    generation: u64,
}

impl ClusterRenderer {
    /// Create an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the marker arena as needing regeneration.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Regenerate the marker arena from a (filtered) point list.
    pub fn rebuild(&mut self, points: &[DataPoint], options: &FilterOptions) {
        self.rebuild_at(points, options, Utc::now());
    }

    /// Regenerate with an explicit `now` for the icon recency tiers.
    pub fn rebuild_at(&mut self, points: &[DataPoint], options: &FilterOptions, now: DateTime<Utc>) {
        self.markers.clear();

        for point in points {
            let icon = MarkerIcon::for_point(point, options.show_visit_frequency, now);
            for (copy, offset) in WORLD_COPY_OFFSETS.iter().enumerate() {
                self.markers.push(Marker {
                    point_id: point.id.clone(),
                    position: LatLng::new(point.latitude, point.longitude + offset),
                    world_copy: copy as i8 - 1,
                    icon: icon.clone(),
                });
            }
        }

        let entries: Vec<MarkerEntry> = self
            .markers
            .iter()
            .enumerate()
            .map(|(index, m)| MarkerEntry {
                index,
                lat: m.position.latitude,
                lng: m.position.longitude,
            })
            .collect();
        self.tree = RTree::bulk_load(entries);
        self.dirty = false;
    }

    /// All generated markers (three world copies per point).
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Cluster the markers visible in `viewport`.
    ///
    /// Each call produces a newer generation; recomputation is cheap and
    /// idempotent, so pan/zoom triggers simply supersede older scenes.
    pub fn scene(&mut self, viewport: &Viewport) -> ClusterScene {
        self.generation += 1;

        let search = AABB::from_corners(
            [viewport.bounds.min_lng, viewport.bounds.min_lat],
            [viewport.bounds.max_lng, viewport.bounds.max_lat],
        );
        let mut visible: Vec<usize> = self
            .tree
            .locate_in_envelope(&search)
            .map(|entry| entry.index)
            .collect();
        // R-tree iteration order is arbitrary; sort for deterministic scenes.
        visible.sort_unstable();

        let mut groups: Vec<PixelGroup> = Vec::new();
        for index in visible {
            let marker = &self.markers[index];
            let (x, y) = project(marker.position.latitude, marker.position.longitude, viewport.zoom);

            match groups
                .iter_mut()
                .find(|g| distance(g.centroid(), (x, y)) <= CLUSTER_RADIUS_PX)
            {
                Some(group) => group.push(index, x, y),
                None => groups.push(PixelGroup::new(index, x, y)),
            }
        }

        let mut clusters = Vec::new();
        let mut markers = Vec::new();
        for group in groups {
            if group.members.len() == 1 {
                markers.push(self.markers[group.members[0]].clone());
            } else {
                let count = group.members.len();
                let (lat, lng) = group.mean_position(&self.markers);
                clusters.push(Cluster {
                    position: LatLng::new(lat, lng),
                    count,
                    tier: ClusterTier::for_count(count),
                    point_ids: group
                        .members
                        .iter()
                        .map(|&i| self.markers[i].point_id.clone())
                        .collect(),
                });
            }
        }

        ClusterScene {
            clusters,
            markers,
            generation: self.generation,
        }
    }
}

/// Greedy pixel-space accumulation of one cluster.
struct PixelGroup {
    members: Vec<usize>,
    sum_x: f64,
    sum_y: f64,
}

impl PixelGroup {
    fn new(index: usize, x: f64, y: f64) -> Self {
        Self {
            members: vec![index],
            sum_x: x,
            sum_y: y,
        }
    }

    fn push(&mut self, index: usize, x: f64, y: f64) {
        self.members.push(index);
        self.sum_x += x;
        self.sum_y += y;
    }

    fn centroid(&self) -> (f64, f64) {
        let n = self.members.len() as f64;
        (self.sum_x / n, self.sum_y / n)
    }

    fn mean_position(&self, markers: &[Marker]) -> (f64, f64) {
        let n = self.members.len() as f64;
        let lat: f64 = self
            .members
            .iter()
            .map(|&i| markers[i].position.latitude)
            .sum();
        let lng: f64 = self
            .members
            .iter()
            .map(|&i| markers[i].position.longitude)
            .sum();
        (lat / n, lng / n)
    }
}

/// Web Mercator world-pixel projection at the given zoom.
fn project(lat: f64, lng: f64, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let clamped = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (clamped.tan() + 1.0 / clamped.cos()).ln() / std::f64::consts::PI) / 2.0 * scale;
    (x, y)
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Bounds that frame every non-duplicated marker with a fixed padding.
///
/// A single point never triggers auto-framing, so this is `None` below two
/// points.
pub fn framing_bounds(points: &[DataPoint]) -> Option<Bounds> {
    if points.len() < 2 {
        return None;
    }
    Bounds::from_points(points).map(|b| b.pad(FRAME_PADDING))
}
