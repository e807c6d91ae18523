//! Statistical aggregation over a point list.
//!
//! All figures are recomputed from scratch on each call; nothing here holds
//! state or mutates the input. Aggregation normally runs over the already
//! filtered set.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::{time, DataPoint};

/// How many entries the most-visited list carries.
const MOST_VISITED_LIMIT: usize = 5;

/// Trailing window for the recent-visit count.
const RECENT_WINDOW_DAYS: i64 = 30;

/// One row of the category breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// Category value; absent categories show as "Unknown".
    pub category: String,
    /// Number of points in the category.
    pub count: usize,
    /// Sum of visit counts across those points.
    pub visit_count: u64,
}

/// One calendar-month bucket of the time distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthStats {
    /// Human-readable "MMM YYYY" label.
    pub month: String,
    pub count: usize,
}

/// Summary statistics for a point list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_points: usize,
    /// Σ(visit count or 1).
    pub total_visits: u64,
    /// Total visits / total points, rounded to one decimal.
    pub average_visits: f64,
    /// Point-count descending; ties keep first-seen order.
    pub categories: Vec<CategoryStats>,
    /// Top 5 points with more than one visit, visit-count descending;
    /// ties keep original order.
    pub most_visited: Vec<DataPoint>,
    /// Chronological month buckets; empty when no point has a parseable
    /// timestamp.
    pub time_distribution: Vec<MonthStats>,
    /// Points whose last visit falls within the trailing 30 days.
    pub recent_visits: usize,
    /// Data-quality counts.
    pub with_visit_data: usize,
    pub with_timestamps: usize,
    pub with_categories: usize,
}

impl Statistics {
    /// Aggregate a point list against the current wall clock.
    pub fn compute(points: &[DataPoint]) -> Self {
        Self::compute_at(points, Utc::now())
    }

    /// Aggregate a point list; `now` anchors the recency window.
    pub fn compute_at(points: &[DataPoint], now: DateTime<Utc>) -> Self {
        let total_points = points.len();
        let total_visits: u64 = points.iter().map(|p| u64::from(p.visits())).sum();
        let average_visits = if total_points == 0 {
            0.0
        } else {
            round1(total_visits as f64 / total_points as f64)
        };

        let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let recent_visits = points
            .iter()
            .filter_map(|p| p.last_visit.as_deref())
            .filter_map(time::parse_timestamp)
            .filter(|last| *last >= recent_cutoff)
            .count();

        Self {
            total_points,
            total_visits,
            average_visits,
            categories: category_breakdown(points),
            most_visited: most_visited(points),
            time_distribution: time_distribution(points),
            recent_visits,
            with_visit_data: points.iter().filter(|p| p.visit_count.is_some()).count(),
            with_timestamps: points.iter().filter(|p| p.timestamp.is_some()).count(),
            with_categories: points.iter().filter(|p| p.category.is_some()).count(),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One row per distinct category, point-count descending. Points without a
/// category are bucketed as "Unknown" for display only.
fn category_breakdown(points: &[DataPoint]) -> Vec<CategoryStats> {
    let mut rows: Vec<CategoryStats> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for point in points {
        let category = point.category.clone().unwrap_or_else(|| "Unknown".into());
        let slot = *index.entry(category.clone()).or_insert_with(|| {
            rows.push(CategoryStats {
                category,
                count: 0,
                visit_count: 0,
            });
            rows.len() - 1
        });
        rows[slot].count += 1;
        rows[slot].visit_count += u64::from(point.visits());
    }

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

fn most_visited(points: &[DataPoint]) -> Vec<DataPoint> {
    let mut repeat: Vec<DataPoint> = points
        .iter()
        .filter(|p| p.visit_count.is_some_and(|v| v > 1))
        .cloned()
        .collect();
    // Stable sort keeps original order between equal visit counts.
    repeat.sort_by(|a, b| b.visits().cmp(&a.visits()));
    repeat.truncate(MOST_VISITED_LIMIT);
    repeat
}

/// Bucket points by calendar month of their timestamp, chronologically
/// ascending. Points without a parseable timestamp are excluded entirely.
fn time_distribution(points: &[DataPoint]) -> Vec<MonthStats> {
    let mut buckets: HashMap<(i32, u32), usize> = HashMap::new();

    for point in points {
        let Some(ts) = point.timestamp.as_deref().and_then(time::parse_timestamp) else {
            continue;
        };
        *buckets.entry((ts.year(), ts.month())).or_insert(0) += 1;
    }

    let mut keys: Vec<(i32, u32)> = buckets.keys().copied().collect();
    keys.sort();

    keys.into_iter()
        .map(|(year, month)| {
            let label = Utc
                .with_ymd_and_hms(year, month, 1, 0, 0, 0)
                .single()
                .map(|dt| time::month_year(&dt))
                .unwrap_or_else(|| format!("{year}-{month:02}"));
            MonthStats {
                month: label,
                count: buckets[&(year, month)],
            }
        })
        .collect()
}
