//! Parsing of degree-bearing coordinate strings.
//!
//! Semantic-segment exports encode locations as `"<lat>°, <lng>°"`. The
//! degree signs are optional and whitespace is arbitrary. A malformed string
//! yields `None` so the caller can skip that point; a single bad coordinate
//! must never abort the whole file's ingestion.

/// Parse a `"<lat>°, <lng>°"` string into `(latitude, longitude)`.
///
/// Returns `None` unless both sides parse to finite numbers.
///
/// # Example
/// ```
/// use placemap::parse_lat_lng;
///
/// assert_eq!(parse_lat_lng("40.7128°, -74.0060°"), Some((40.7128, -74.0060)));
/// assert_eq!(parse_lat_lng("  51.5 , -0.12 "), Some((51.5, -0.12)));
/// assert_eq!(parse_lat_lng("north, west"), None);
/// ```
pub fn parse_lat_lng(raw: &str) -> Option<(f64, f64)> {
    let cleaned = raw.replace('°', "");
    let (lat_str, lng_str) = cleaned.split_once(',')?;

    let lat: f64 = lat_str.trim().parse().ok()?;
    let lng: f64 = lng_str.trim().parse().ok()?;

    if lat.is_finite() && lng.is_finite() {
        Some((lat, lng))
    } else {
        None
    }
}
