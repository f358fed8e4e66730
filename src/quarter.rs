use crate::models::{ChartSeries, QuarterPoint};
use once_cell::sync::Lazy;
use regex::Regex;

static QUARTER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})Q([1-4])$").expect("quarter id pattern is valid"));

fn split(quarter: &str) -> Option<(u32, u32)> {
    let caps = QUARTER_ID.captures(quarter)?;
    let year = caps[1].parse().ok()?;
    let q = caps[2].parse().ok()?;
    Some((year, q))
}

/// Sort key for a `YYYYQn` id: `year * 10 + n`.
///
/// Ids that do not match the pattern sort first with key `0`. That value is
/// also what a genuine `0000Q0` would produce if it were valid, so callers
/// cannot tell the two apart.
pub fn parse_sort_key(quarter: &str) -> u32 {
    match split(quarter) {
        Some((year, q)) => year * 10 + q,
        None => 0,
    }
}

/// Display label, `2023Q1` becomes `Q1 2023`. Malformed ids are returned as-is.
pub fn format_label(quarter: &str) -> String {
    match split(quarter) {
        Some((year, q)) => format!("Q{q} {year:04}"),
        None => quarter.to_string(),
    }
}

pub fn into_series(mut points: Vec<QuarterPoint>) -> ChartSeries {
    points.sort_by_key(|point| parse_sort_key(&point.quarter));

    let labels = points.iter().map(|point| format_label(&point.quarter)).collect();
    let values = points.into_iter().map(|point| point.value).collect();

    ChartSeries { labels, values }
}
