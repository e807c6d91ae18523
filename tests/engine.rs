//! Tests for the engine: canonical state, replace-or-fail ingestion, derived
//! views and boundary management.

use placemap::{
    Boundary, Bounds, ExportFormat, FilterOptions, LatLng, SourceFormat, TimelineEngine, Viewport,
};

const CSV_A: &str = "latitude,longitude,title,category\n40.0,-74.0,Alpha,restaurant\n41.0,-73.0,Beta,hotel\n";
const CSV_B: &str = "latitude,longitude,title\n10.0,20.0,Gamma\n";

fn boundary(id: &str, name: &str) -> Boundary {
    Boundary {
        id: id.to_string(),
        name: name.to_string(),
        coordinates: vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 0.0),
        ],
        color: "#97009c".to_string(),
    }
}

// ============================================================================
// Ingestion
// ============================================================================

#[test]
fn import_replaces_the_previous_batch() {
    let mut engine = TimelineEngine::new();

    assert_eq!(engine.import_str(CSV_A, SourceFormat::Csv).unwrap(), 2);
    assert_eq!(engine.import_str(CSV_B, SourceFormat::Csv).unwrap(), 1);

    assert_eq!(engine.points().len(), 1);
    assert_eq!(engine.points()[0].title, "Gamma");
}

#[test]
fn failed_import_keeps_the_previous_batch() {
    let mut engine = TimelineEngine::new();
    engine.import_str(CSV_A, SourceFormat::Csv).unwrap();

    let err = engine.import_str("latitude,longitude\n999.0,0.0\n", SourceFormat::Csv);
    assert!(err.is_err());

    // Replace-or-fail: the failed file changed nothing.
    assert_eq!(engine.points().len(), 2);
    assert_eq!(engine.points()[0].title, "Alpha");
}

#[test]
fn clear_drops_points_but_keeps_boundaries() {
    let mut engine = TimelineEngine::new();
    engine.import_str(CSV_A, SourceFormat::Csv).unwrap();
    engine.add_boundary(boundary("b1", "Home zone"));

    engine.clear();

    assert!(!engine.has_data());
    assert_eq!(engine.boundaries().len(), 1);
}

// ============================================================================
// Filters and derived views
// ============================================================================

#[test]
fn filters_narrow_the_derived_views() {
    let mut engine = TimelineEngine::new();
    engine.import_str(CSV_A, SourceFormat::Csv).unwrap();

    engine.set_filters(FilterOptions {
        categories: Some(vec!["restaurant".to_string()]),
        ..Default::default()
    });

    let filtered = engine.filtered();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Alpha");

    // The canonical set itself is untouched.
    assert_eq!(engine.points().len(), 2);
    assert_eq!(engine.statistics().total_points, 1);
}

#[test]
fn available_categories_are_distinct_in_first_seen_order() {
    let csv = "latitude,longitude,title,category\n\
               1.0,2.0,A,hotel\n\
               3.0,4.0,B,restaurant\n\
               5.0,6.0,C,hotel\n";
    let mut engine = TimelineEngine::new();
    engine.import_str(csv, SourceFormat::Csv).unwrap();

    assert_eq!(engine.available_categories(), vec!["hotel", "restaurant"]);
}

#[test]
fn scene_tracks_filter_changes() {
    let mut engine = TimelineEngine::new();
    engine.import_str(CSV_A, SourceFormat::Csv).unwrap();

    let view = Viewport {
        bounds: Bounds {
            min_lat: 39.0,
            max_lat: 42.0,
            min_lng: -75.0,
            max_lng: -72.0,
        },
        zoom: 8.0,
    };

    let all = engine.scene(&view);
    let visible = all.clusters.iter().map(|c| c.count).sum::<usize>() + all.markers.len();
    assert_eq!(visible, 2);

    engine.set_filters(FilterOptions {
        categories: Some(vec!["hotel".to_string()]),
        ..Default::default()
    });
    let narrowed = engine.scene(&view);
    assert_eq!(narrowed.clusters.len(), 0);
    assert_eq!(narrowed.markers.len(), 1);
    assert_eq!(narrowed.markers[0].point_id, "point_2");
    assert!(narrowed.generation > all.generation);
}

#[test]
fn framing_bounds_follow_the_filtered_set() {
    let mut engine = TimelineEngine::new();
    engine.import_str(CSV_A, SourceFormat::Csv).unwrap();
    assert!(engine.framing_bounds().is_some());

    // Narrow to a single point: no auto-framing.
    engine.set_filters(FilterOptions {
        categories: Some(vec!["hotel".to_string()]),
        ..Default::default()
    });
    assert!(engine.framing_bounds().is_none());
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn engine_exports_the_filtered_subset() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = TimelineEngine::new();
    engine.import_str(CSV_A, SourceFormat::Csv).unwrap();
    engine.set_filters(FilterOptions {
        categories: Some(vec!["restaurant".to_string()]),
        ..Default::default()
    });

    let path = engine
        .export_to_file(dir.path(), ExportFormat::Json, true)
        .unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(value["metadata"]["totalPoints"], 1);
    assert_eq!(value["metadata"]["originalDataPoints"], 2);
    assert_eq!(value["data"][0]["title"], "Alpha");
}

#[test]
fn export_with_nothing_filtered_fails_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = TimelineEngine::new();
    engine.import_str(CSV_A, SourceFormat::Csv).unwrap();
    engine.set_filters(FilterOptions {
        categories: Some(Vec::new()),
        ..Default::default()
    });

    assert!(engine
        .export_to_file(dir.path(), ExportFormat::Csv, false)
        .is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(engine.points().len(), 2);
}

// ============================================================================
// Boundaries
// ============================================================================

#[test]
fn boundary_edits_compound() {
    let mut engine = TimelineEngine::new();
    engine.add_boundary(boundary("b1", "First"));
    engine.add_boundary(boundary("b2", "Second"));

    // Consecutive renames both stick.
    assert!(engine.rename_boundary("b1", "First v2"));
    assert!(engine.rename_boundary("b2", "Second v2"));
    assert_eq!(engine.boundaries()[0].name, "First v2");
    assert_eq!(engine.boundaries()[1].name, "Second v2");

    assert!(!engine.rename_boundary("missing", "x"));

    let removed = engine.remove_boundary("b1").unwrap();
    assert_eq!(removed.name, "First v2");
    assert!(engine.remove_boundary("b1").is_none());
    assert_eq!(engine.boundaries().len(), 1);
    assert_eq!(engine.boundaries()[0].id, "b2");
}
