//! Elevation gain/loss and altitude distribution.
//!
//! Barometric and GPS altitude both jitter by a few decimeters from one
//! sample to the next. A step between consecutive readings only counts
//! toward gain or loss when it is at least `elevation_noise_threshold`
//! meters.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::preprocess::PreparedStream;
use crate::statistics::summarize;
use crate::zones::{ZoneDistribution, ZoneSet};

/// Vertical ascent speed (VAM) distribution, in meters per hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AscentSpeed {
    pub avg: Option<f64>,
    pub lower_quartile: Option<f64>,
    pub median: Option<f64>,
    pub upper_quartile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationData {
    pub avg_elevation: Option<f64>,
    pub median_elevation: Option<f64>,
    pub lower_quartile_elevation: Option<f64>,
    pub upper_quartile_elevation: Option<f64>,
    /// Meters climbed
    pub accumulated_elevation_ascent: f64,
    /// Meters descended (positive)
    pub accumulated_elevation_descent: f64,
    pub ascent_speed: Option<AscentSpeed>,
    pub elevation_zones: Option<ZoneDistribution>,
}

/// Ascent and descent from consecutive altitude steps, skipping steps
/// smaller than `threshold`.
///
/// Returns `(ascent, descent)` in meters, both non-negative.
pub fn accumulate_elevation(altitude: &[f64], threshold: f64) -> (f64, f64) {
    let mut ascent = 0.0;
    let mut descent = 0.0;

    for pair in altitude.windows(2) {
        let delta = pair[1] - pair[0];
        if delta.abs() < threshold {
            continue;
        }
        if delta > 0.0 {
            ascent += delta;
        } else {
            descent -= delta;
        }
    }

    (ascent, descent)
}

/// Climbing rate on moving uphill samples, in meters per hour.
fn ascent_speeds(prepared: &PreparedStream, config: &AnalysisConfig) -> Vec<f64> {
    if prepared.grade.is_empty() {
        return Vec::new();
    }
    prepared
        .moving_indices()
        .filter(|&i| prepared.grade[i] > config.grade_climbing_limit)
        .filter_map(|i| {
            let gain = prepared.altitude[i] - prepared.altitude[i - 1];
            (gain > 0.0).then(|| gain / prepared.durations[i] * 3600.0)
        })
        .collect()
}

/// Analyze the altitude channel. `None` when it is absent.
pub fn analyze(
    prepared: &PreparedStream,
    config: &AnalysisConfig,
    zones: Option<&ZoneSet>,
) -> Option<ElevationData> {
    if prepared.altitude.is_empty() {
        return None;
    }

    let (ascent, descent) =
        accumulate_elevation(prepared.altitude, config.elevation_noise_threshold);

    let moving_altitudes: Vec<f64> = prepared
        .moving_indices()
        .map(|i| prepared.altitude[i])
        .collect();
    let summary = summarize(&moving_altitudes);

    let speeds = ascent_speeds(prepared, config);
    let ascent_speed = if speeds.is_empty() {
        None
    } else {
        let s = summarize(&speeds);
        Some(AscentSpeed {
            avg: s.mean,
            lower_quartile: s.lower_quartile,
            median: s.median,
            upper_quartile: s.upper_quartile,
        })
    };

    debug!(
        "[Elevation] +{:.1} m / -{:.1} m over {} samples",
        ascent,
        descent,
        prepared.altitude.len()
    );

    Some(ElevationData {
        avg_elevation: summary.mean,
        median_elevation: summary.median,
        lower_quartile_elevation: summary.lower_quartile,
        upper_quartile_elevation: summary.upper_quartile,
        accumulated_elevation_ascent: ascent,
        accumulated_elevation_descent: descent,
        ascent_speed,
        elevation_zones: zones.map(|z| prepared.zone_distribution(prepared.altitude, z)),
    })
}
