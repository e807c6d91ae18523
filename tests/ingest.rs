//! Tests for the ingestion pipeline: format adapters, normalization,
//! validation, enrichment.

use placemap::{import_str, ImportError, SourceFormat};
use serde_json::json;

// ============================================================================
// CSV adapter
// ============================================================================

#[test]
fn csv_two_rows() {
    let csv = "latitude,longitude,title\n40.7128,-74.0060,New York\n34.0522,-118.2437,Los Angeles";
    let points = import_str(csv, SourceFormat::Csv).unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].id, "point_1");
    assert_eq!(points[1].id, "point_2");
    assert_eq!(points[0].title, "New York");
    assert_eq!(points[0].latitude, 40.7128);
    assert_eq!(points[0].longitude, -74.0060);
}

#[test]
fn csv_empty_body_is_no_valid_points() {
    let err = import_str("latitude,longitude,title\n", SourceFormat::Csv).unwrap_err();
    assert!(matches!(err, ImportError::NoValidPoints { .. }));
    assert_eq!(err.to_string(), "No valid data points found in CSV file");
}

#[test]
fn csv_header_only_is_malformed() {
    let err = import_str("latitude,longitude,title", SourceFormat::Csv).unwrap_err();
    assert!(matches!(err, ImportError::MalformedInput { .. }));
}

#[test]
fn csv_mismatched_column_count_is_skipped() {
    let csv = "latitude,longitude,title\n1.0,2.0\n3.0,4.0,Kept";
    let points = import_str(csv, SourceFormat::Csv).unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].title, "Kept");
    // The skipped row still consumed its index.
    assert_eq!(points[0].id, "point_2");
}

#[test]
fn csv_non_numeric_coordinate_is_skipped_not_fatal() {
    let csv = "latitude,longitude,title\nnorth,2.0,Bad\n3.0,4.0,Good";
    let points = import_str(csv, SourceFormat::Csv).unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].title, "Good");
}

#[test]
fn csv_aliases_and_synthesized_title() {
    let csv = "lat,lng,desc\n1.5,2.5,a place";
    let points = import_str(csv, SourceFormat::Csv).unwrap();

    assert_eq!(points[0].latitude, 1.5);
    assert_eq!(points[0].longitude, 2.5);
    assert_eq!(points[0].title, "Point 1");
    assert_eq!(points[0].description.as_deref(), Some("a place"));
}

#[test]
fn csv_quotes_are_stripped() {
    let csv = "\"latitude\",\"longitude\",\"title\"\n\"1.0\",\"2.0\",\"Quoted\"";
    let points = import_str(csv, SourceFormat::Csv).unwrap();
    assert_eq!(points[0].title, "Quoted");
    assert_eq!(points[0].latitude, 1.0);
}

#[test]
fn csv_unrecognized_columns_land_in_extras() {
    let csv = "latitude,longitude,title,rating,customField\n1.0,2.0,Spot,5,hello";
    let points = import_str(csv, SourceFormat::Csv).unwrap();

    let extras = &points[0].extras;
    assert_eq!(extras.get("rating"), Some(&json!("5")));
    assert_eq!(extras.get("customField"), Some(&json!("hello")));
    // Consumed aliases never shadow the canonical fields.
    assert!(extras.get("latitude").is_none());
    assert!(extras.get("title").is_none());
}

#[test]
fn csv_out_of_range_coordinates_fail_validation() {
    let csv = "latitude,longitude,title\n95.0,2.0,TooFarNorth";
    let err = import_str(csv, SourceFormat::Csv).unwrap_err();
    assert!(matches!(err, ImportError::NoValidPoints { .. }));
}

// ============================================================================
// Generic JSON arrays
// ============================================================================

#[test]
fn json_array_single_point() {
    let text = r#"[{"latitude":40.7128,"longitude":-74.006,"title":"New York"}]"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].id, "point_0");
    assert_eq!(points[0].title, "New York");
}

#[test]
fn json_array_keeps_source_id_and_numeric_strings() {
    let text = r#"[{"id":"home","lat":"51.5","lon":"-0.12","name":"London"}]"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points[0].id, "home");
    assert_eq!(points[0].latitude, 51.5);
    assert_eq!(points[0].longitude, -0.12);
    assert_eq!(points[0].title, "London");
}

#[test]
fn json_array_invalid_entries_are_dropped() {
    let text = r#"[
        {"latitude": 1.0, "longitude": 2.0, "title": "Good"},
        {"latitude": 999.0, "longitude": 2.0, "title": "OutOfRange"},
        {"title": "NoCoords"}
    ]"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].title, "Good");
}

#[test]
fn json_with_only_invalid_entries_is_no_valid_points() {
    let err = import_str(r#"[{"title": "NoCoords"}]"#, SourceFormat::Json).unwrap_err();
    assert!(matches!(err, ImportError::NoValidPoints { .. }));
    assert_eq!(err.to_string(), "No valid data points found in JSON file");
}

#[test]
fn json_syntax_error_is_malformed_input() {
    let err = import_str("{not json", SourceFormat::Json).unwrap_err();
    assert!(matches!(err, ImportError::MalformedInput { .. }));
}

#[test]
fn json_unrecognized_shape_is_invalid_format() {
    let err = import_str(r#"{"points": []}"#, SourceFormat::Json).unwrap_err();
    assert!(matches!(err, ImportError::InvalidFormat));
}

#[test]
fn json_visit_count_and_timestamp_enrichment() {
    let text = r#"[{
        "latitude": 1.0, "longitude": 2.0, "title": "Cafe",
        "visitCount": 4, "timestamp": "2024-07-15T10:30:00Z",
        "lastVisit": "2024-07-20"
    }]"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points[0].visit_count, Some(4));
    assert_eq!(points[0].month_year.as_deref(), Some("Jul 2024"));
    assert_eq!(points[0].last_visit.as_deref(), Some("2024-07-20"));
}

#[test]
fn json_unparseable_timestamp_leaves_month_year_unset() {
    let text = r#"[{"latitude": 1.0, "longitude": 2.0, "timestamp": "whenever"}]"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points[0].timestamp.as_deref(), Some("whenever"));
    assert!(points[0].month_year.is_none());
}

// ============================================================================
// GeoJSON
// ============================================================================

#[test]
fn geojson_axis_order_is_lng_lat() {
    let text = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-74.006, 40.7128]},
            "properties": {"name": "New York", "category": "city"}
        }]
    }"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points[0].latitude, 40.7128);
    assert_eq!(points[0].longitude, -74.006);
    assert_eq!(points[0].title, "New York");
    assert_eq!(points[0].category.as_deref(), Some("city"));
}

#[test]
fn geojson_properties_merge_into_extras() {
    let text = r#"{
        "features": [{
            "geometry": {"coordinates": [2.0, 1.0]},
            "properties": {"title": "Spot", "rating": 5}
        }]
    }"#;
    let points = import_str(text, SourceFormat::Json).unwrap();
    assert_eq!(points[0].extras.get("rating"), Some(&json!(5)));
}

#[test]
fn geojson_feature_id_wins_over_synthesized() {
    let text = r#"{
        "features": [{
            "id": "f-17",
            "geometry": {"coordinates": [2.0, 1.0]},
            "properties": {}
        }]
    }"#;
    let points = import_str(text, SourceFormat::Json).unwrap();
    assert_eq!(points[0].id, "f-17");
}

// ============================================================================
// Semantic segments
// ============================================================================

#[test]
fn segments_timeline_path_point() {
    let text = r#"{
        "semanticSegments": [{
            "timelinePath": [{"point": "40.7128°, -74.0060°", "time": "t1"}]
        }]
    }"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].id, "timelinePath_0");
    assert_eq!(points[0].title, "Timeline Path");
    assert!((points[0].latitude - 40.7128).abs() < 1e-9);
    assert!((points[0].longitude - -74.0060).abs() < 1e-9);
    assert_eq!(points[0].timestamp.as_deref(), Some("t1"));
}

#[test]
fn segments_share_one_id_counter() {
    let text = r#"{
        "semanticSegments": [{
            "startTime": "2024-07-01T08:00:00Z",
            "endTime": "2024-07-01T09:00:00Z",
            "timelinePath": [{"point": "1.0°, 2.0°", "time": "t1"}],
            "visit": {
                "topCandidate": {
                    "semanticType": "Home",
                    "placeLocation": {"latLng": "3.0°, 4.0°"}
                }
            },
            "activity": {
                "start": {"latLng": "5.0°, 6.0°"},
                "end": {"latLng": "7.0°, 8.0°"}
            }
        }]
    }"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["timelinePath_0", "visit_1", "activity_start_2", "activity_end_3"]
    );
    assert_eq!(points[1].title, "Home");
    assert_eq!(points[2].title, "Activity Start");
    assert_eq!(points[3].title, "Activity End");
    assert_eq!(points[1].timestamp.as_deref(), Some("2024-07-01T08:00:00Z"));
    assert_eq!(points[3].timestamp.as_deref(), Some("2024-07-01T09:00:00Z"));
}

#[test]
fn segments_visit_without_semantic_type_is_titled_visit() {
    let text = r#"{
        "semanticSegments": [{
            "visit": {"topCandidate": {"placeLocation": {"latLng": "1.0°, 2.0°"}}}
        }]
    }"#;
    let points = import_str(text, SourceFormat::Json).unwrap();
    assert_eq!(points[0].title, "Visit");
}

#[test]
fn segments_malformed_coordinate_drops_only_that_point() {
    let text = r#"{
        "semanticSegments": [{
            "timelinePath": [
                {"point": "garbage", "time": "t1"},
                {"point": "1.0°, 2.0°", "time": "t2"}
            ]
        }]
    }"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].timestamp.as_deref(), Some("t2"));
}

// ============================================================================
// Validator invariant
// ============================================================================

#[test]
fn every_ingested_point_is_in_world_range() {
    let text = r#"[
        {"latitude": 40.0, "longitude": -74.0},
        {"latitude": -91.0, "longitude": 0.0},
        {"latitude": 0.0, "longitude": 181.0},
        {"latitude": 89.9, "longitude": 179.9}
    ]"#;
    let points = import_str(text, SourceFormat::Json).unwrap();

    assert_eq!(points.len(), 2);
    for p in &points {
        assert!(p.latitude >= -90.0 && p.latitude <= 90.0);
        assert!(p.longitude >= -180.0 && p.longitude <= 180.0);
        assert!(p.is_valid());
    }
}
