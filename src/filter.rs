//! Pure filtering of the canonical point set.
//!
//! `(points, options) -> points'` with no side effects: same inputs always
//! produce the same output, relative order preserved. A point passes only if
//! every specified predicate passes.

use crate::{time, DataPoint, FilterOptions};

/// Apply a [`FilterOptions`] predicate to a point list.
///
/// Predicate semantics:
/// - Time range: inclusive on both ends; a point without a timestamp (or with
///   one that does not parse) is not excluded by a time filter.
/// - Visit count: defaults to 1 when absent, then checked against the
///   min/max bounds where set.
/// - Categories: `None` passes everything; an explicit list requires
///   membership, so an empty list passes nothing and a point without a
///   category is excluded whenever any category filter is active.
///
/// # Example
/// ```
/// use placemap::{apply_filters, DataPoint, FilterOptions};
///
/// let mut restaurant = DataPoint::new("a", 1.0, 2.0, "Cafe");
/// restaurant.category = Some("restaurant".to_string());
/// let hotel = DataPoint::new("b", 3.0, 4.0, "Inn");
///
/// let options = FilterOptions {
///     categories: Some(vec!["restaurant".to_string()]),
///     ..Default::default()
/// };
/// let filtered = apply_filters(&[restaurant, hotel], &options);
/// assert_eq!(filtered.len(), 1);
/// assert_eq!(filtered[0].id, "a");
/// ```
pub fn apply_filters(points: &[DataPoint], options: &FilterOptions) -> Vec<DataPoint> {
    points
        .iter()
        .filter(|point| passes(point, options))
        .cloned()
        .collect()
}

fn passes(point: &DataPoint, options: &FilterOptions) -> bool {
    if let (Some(range), Some(raw)) = (&options.time_range, point.timestamp.as_deref()) {
        if let Some(ts) = time::parse_timestamp(raw) {
            if ts < range.start || ts > range.end {
                return false;
            }
        }
    }

    let visits = point.visits();
    if let Some(min) = options.min_visit_count {
        if visits < min {
            return false;
        }
    }
    if let Some(max) = options.max_visit_count {
        if visits > max {
            return false;
        }
    }

    if let Some(categories) = &options.categories {
        match &point.category {
            Some(category) => {
                if !categories.iter().any(|c| c == category) {
                    return false;
                }
            }
            None => return false,
        }
    }

    true
}
