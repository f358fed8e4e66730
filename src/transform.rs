//! Derived series for the multi-series chart recipes.
//!
//! Every function returns a series of the same length as its input so the
//! result stays index-aligned with the quarter labels.

pub const DEFAULT_WINDOW: usize = 3;
pub const DEFAULT_MARGIN: f64 = 5.0;

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}

/// Trailing mean over `window` points, rounded to two decimals.
///
/// The first `window - 1` entries average whatever prefix is available rather
/// than being left empty.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|idx| {
            let start = (idx + 1).saturating_sub(window);
            let slice = &values[start..=idx];
            round2(slice.iter().sum::<f64>() / slice.len() as f64)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Envelope of `±margin` around each value. The lower edge never drops below zero.
pub fn band(values: &[f64], margin: f64) -> Band {
    Band {
        lower: values.iter().map(|value| round2(value - margin).max(0.0)).collect(),
        upper: values.iter().map(|value| round2(value + margin)).collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    pub delta: Vec<Option<f64>>,
    pub gains: Vec<Option<f64>>,
    pub losses: Vec<Option<f64>>,
}

/// Quarter-over-quarter change, split into positive and negative halves.
/// Index 0 has no predecessor and is `None` in all three series.
pub fn signed_delta(values: &[f64]) -> Delta {
    let delta: Vec<Option<f64>> = values
        .iter()
        .enumerate()
        .map(|(idx, value)| match idx {
            0 => None,
            _ => Some(round2(value - values[idx - 1])),
        })
        .collect();

    let gains = delta.iter().map(|d| d.filter(|d| *d > 0.0)).collect();
    let losses = delta.iter().map(|d| d.filter(|d| *d < 0.0)).collect();

    Delta { delta, gains, losses }
}
