//! Speed and pace sections.
//!
//! Speeds are reported in km/h and paces in seconds per kilometer. Pace
//! statistics are the speed statistics converted with `3600 / x`, so the
//! lower quartile pace is the pace of the lower quartile speed.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::preprocess::PreparedStream;
use crate::statistics::{moving_values, ratio, summarize, trapezoidal_mean};
use crate::zones::{ZoneDistribution, ZoneSet};

/// Meters per second to kilometers per hour.
pub const MS_TO_KMH: f64 = 3.6;

/// Seconds per kilometer at `kmh`, `None` at standstill.
pub fn speed_to_pace(kmh: f64) -> Option<f64> {
    ratio(3600.0, kmh)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedData {
    /// Average while moving
    pub genuine_avg_speed: Option<f64>,
    /// Average over elapsed time
    pub total_avg_speed: Option<f64>,
    pub max_speed: Option<f64>,
    /// Seconds per kilometer, rounded
    pub avg_pace: Option<u32>,
    pub lower_quartile_speed: Option<f64>,
    pub median_speed: Option<f64>,
    pub upper_quartile_speed: Option<f64>,
    pub variance_speed: Option<f64>,
    pub standard_deviation_speed: Option<f64>,
    pub speed_zones: Option<ZoneDistribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceData {
    pub avg_pace: Option<u32>,
    pub lower_quartile_pace: Option<f64>,
    pub median_pace: Option<f64>,
    pub upper_quartile_pace: Option<f64>,
    pub variance_pace: Option<f64>,
    pub pace_zones: Option<ZoneDistribution>,
}

/// Analyze speed and pace.
///
/// Both sections are `None` without a velocity channel.
pub fn analyze(
    prepared: &PreparedStream,
    move_ratio: Option<f64>,
    speed_zones: Option<&ZoneSet>,
    pace_zones: Option<&ZoneSet>,
) -> Option<(SpeedData, PaceData)> {
    if prepared.velocity.is_empty() {
        return None;
    }

    let kmh: Vec<f64> = prepared.velocity.iter().map(|v| v * MS_TO_KMH).collect();
    let genuine = trapezoidal_mean(&kmh, &prepared.durations, &prepared.moving);
    let summary = summarize(&moving_values(&kmh, &prepared.moving));
    let avg_pace = genuine
        .and_then(speed_to_pace)
        .map(|pace| pace.round() as u32);

    debug!(
        "[Movement] genuine avg {:?} km/h, pace {:?} s/km",
        genuine,
        avg_pace
    );

    let speed = SpeedData {
        genuine_avg_speed: genuine,
        total_avg_speed: genuine.zip(move_ratio).map(|(s, r)| s * r),
        max_speed: kmh.iter().copied().reduce(f64::max),
        avg_pace,
        lower_quartile_speed: summary.lower_quartile,
        median_speed: summary.median,
        upper_quartile_speed: summary.upper_quartile,
        variance_speed: summary.variance,
        standard_deviation_speed: summary.standard_deviation,
        speed_zones: speed_zones.map(|z| prepared.zone_distribution(&kmh, z)),
    };

    let pace = PaceData {
        avg_pace,
        lower_quartile_pace: summary.lower_quartile.and_then(speed_to_pace),
        median_pace: summary.median.and_then(speed_to_pace),
        upper_quartile_pace: summary.upper_quartile.and_then(speed_to_pace),
        variance_pace: summary.variance.and_then(speed_to_pace),
        pace_zones: pace_zones.map(|z| {
            // standstill samples fall outside every pace zone
            let paces: Vec<f64> = kmh
                .iter()
                .map(|&s| speed_to_pace(s).unwrap_or(f64::INFINITY))
                .collect();
            prepared.zone_distribution(&paces, z)
        }),
    };

    Some((speed, pace))
}
