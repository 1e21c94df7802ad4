//! Distribution statistics shared by every metric channel.
//!
//! [`summarize`] is the single place where mean, percentiles and spread are
//! computed; the speed, power, heart rate, cadence, grade and elevation
//! sections all feed their moving samples through it.

use serde::{Deserialize, Serialize};

/// Distribution statistics of a numeric series.
///
/// Every field is `None` for an empty series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// 25th percentile
    pub lower_quartile: Option<f64>,
    /// 75th percentile
    pub upper_quartile: Option<f64>,
    /// Population variance
    pub variance: Option<f64>,
    pub standard_deviation: Option<f64>,
}

/// Types that can be summarized as a numeric channel.
pub trait Summarize {
    fn summarize(&self) -> Summary;
}

impl Summarize for [f64] {
    fn summarize(&self) -> Summary {
        summarize(self)
    }
}

/// Summarize a series.
///
/// Percentiles are linearly interpolated on a sorted copy at
/// `rank = p * (n - 1)`.
pub fn summarize(values: &[f64]) -> Summary {
    if values.is_empty() {
        return Summary::default();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Summary {
        mean: Some(mean),
        median: percentile_sorted(&sorted, 0.5),
        lower_quartile: percentile_sorted(&sorted, 0.25),
        upper_quartile: percentile_sorted(&sorted, 0.75),
        variance: Some(variance),
        standard_deviation: Some(variance.sqrt()),
    }
}

/// Percentile `p` (0..=1) of an ascending series.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Time-weighted average of a channel over moving samples.
///
/// Each moving sample `i` contributes the mean of `values[i - 1]` and
/// `values[i]` over its duration. Returns `None` when no time is covered.
pub fn trapezoidal_mean(values: &[f64], durations: &[f64], moving: &[bool]) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut total_duration = 0.0;

    for i in 1..values.len().min(durations.len()).min(moving.len()) {
        if !moving[i] {
            continue;
        }
        weighted_sum += (values[i] + values[i - 1]) / 2.0 * durations[i];
        total_duration += durations[i];
    }

    if total_duration > 0.0 {
        Some(weighted_sum / total_duration)
    } else {
        None
    }
}

/// Values of a channel at moving samples.
pub(crate) fn moving_values(values: &[f64], moving: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(moving)
        .filter(|(_, m)| **m)
        .map(|(&v, _)| v)
        .collect()
}

/// `numerator / denominator`, or `None` when the result would not be finite.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}
