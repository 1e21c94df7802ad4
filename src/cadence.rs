//! Cadence section: pedalling (or stepping) time and crank revolutions.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::preprocess::PreparedStream;
use crate::statistics::{ratio, summarize};
use crate::zones::{ZoneDistribution, ZoneSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadenceData {
    /// Share of moving samples with a non-zero cadence, percent
    pub cadence_percentage_moving: Option<f64>,
    /// Seconds with a non-zero cadence while moving
    pub cadence_time_moving: f64,
    pub average_cadence_moving: Option<f64>,
    pub standard_deviation_cadence: Option<f64>,
    pub lower_quartile_cadence: Option<f64>,
    pub median_cadence: Option<f64>,
    pub upper_quartile_cadence: Option<f64>,
    pub crank_revolutions: f64,
    pub cadence_zones: Option<ZoneDistribution>,
}

/// Analyze the cadence channel. `None` when it is absent.
pub fn analyze(prepared: &PreparedStream, zones: Option<&ZoneSet>) -> Option<CadenceData> {
    let cadence = prepared.cadence;
    if cadence.is_empty() {
        return None;
    }

    let mut moving_samples = 0usize;
    let mut active = Vec::new();
    let mut active_seconds = 0.0;
    let mut revolutions = 0.0;

    for i in prepared.moving_indices() {
        moving_samples += 1;
        if cadence[i] > 0.0 {
            let dt = prepared.durations[i];
            active.push(cadence[i]);
            active_seconds += dt;
            revolutions += cadence[i] * dt / 60.0;
        }
    }

    let summary = summarize(&active);

    debug!(
        "[Cadence] {} of {} moving samples active, {:.0} revolutions",
        active.len(),
        moving_samples,
        revolutions
    );

    Some(CadenceData {
        cadence_percentage_moving: ratio(active.len() as f64, moving_samples as f64)
            .map(|r| r * 100.0),
        cadence_time_moving: active_seconds,
        average_cadence_moving: summary.mean,
        standard_deviation_cadence: summary.standard_deviation,
        lower_quartile_cadence: summary.lower_quartile,
        median_cadence: summary.median,
        upper_quartile_cadence: summary.upper_quartile,
        crank_revolutions: revolutions,
        cadence_zones: zones.map(|z| prepared.zone_distribution(cadence, z)),
    })
}
