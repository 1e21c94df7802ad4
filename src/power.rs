//! Power metrics: average, weighted power, variability and intensity.
//!
//! Power can come from three places: a power meter, the provider's own
//! estimate (`watts_calc`), or the running power model. [`select_channel`]
//! picks one up front and tags it; [`analyze`] treats every channel the same.

use std::borrow::Cow;
use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::preprocess::PreparedStream;
use crate::running_power::create_running_power_estimation_stream;
use crate::statistics::{moving_values, ratio, summarize, trapezoidal_mean};
use crate::types::ActivityType;
use crate::zones::{ZoneDistribution, ZoneSet};

/// Where the power values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerSource {
    /// Measured by a power meter
    Meter,
    /// Estimated by the activity provider
    Provider,
    /// Synthesized from grade adjusted distance
    RunningModel,
}

/// Power values for the analysis window, tagged with their source.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerChannel<'a> {
    pub values: Cow<'a, [f64]>,
    pub source: PowerSource,
}

impl<'a> PowerChannel<'a> {
    pub fn borrowed(values: &'a [f64], source: PowerSource) -> Self {
        Self {
            values: Cow::Borrowed(values),
            source,
        }
    }

    pub fn owned(values: Vec<f64>, source: PowerSource) -> Self {
        Self {
            values: Cow::Owned(values),
            source,
        }
    }
}

/// Pick the power channel for an activity.
///
/// Runs without a power meter use the running model when grade adjusted
/// distance is available. Otherwise recorded watts win over the
/// provider's estimate.
pub fn select_channel<'a>(
    prepared: &PreparedStream<'a>,
    activity_type: &ActivityType,
    has_power_meter: bool,
    weight: f64,
) -> Result<Option<PowerChannel<'a>>> {
    if activity_type.is_running()
        && !has_power_meter
        && !prepared.grade_adjusted_distance.is_empty()
    {
        let estimated = create_running_power_estimation_stream(
            weight,
            prepared.grade_adjusted_distance,
            prepared.time,
        )?;
        debug!("[Power] using running power model ({} samples)", estimated.len());
        return Ok(Some(PowerChannel::owned(estimated, PowerSource::RunningModel)));
    }

    if !prepared.watts.is_empty() {
        let source = if has_power_meter {
            PowerSource::Meter
        } else {
            PowerSource::Provider
        };
        return Ok(Some(PowerChannel::borrowed(prepared.watts, source)));
    }

    if !prepared.watts_calc.is_empty() {
        return Ok(Some(PowerChannel::borrowed(
            prepared.watts_calc,
            PowerSource::Provider,
        )));
    }

    Ok(None)
}

/// Athlete and provider values the power section depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerSettings {
    /// Kilograms
    pub weight: f64,
    /// FTP matching the activity type
    pub ftp: Option<f64>,
    pub has_power_meter: bool,
    /// Provider weighted power, used when the window never fills
    pub fallback_weighted_power: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerData {
    pub has_power_meter: bool,
    pub is_estimated_running_power: bool,
    pub power_source: PowerSource,
    pub avg_watts: Option<f64>,
    pub avg_watts_per_kg: Option<f64>,
    pub max_watts: Option<f64>,
    pub weighted_power: Option<f64>,
    pub weighted_watts_per_kg: Option<f64>,
    pub variability_index: Option<f64>,
    pub punch_factor: Option<f64>,
    pub lower_quartile_watts: Option<f64>,
    pub median_watts: Option<f64>,
    pub upper_quartile_watts: Option<f64>,
    pub power_zones: Option<ZoneDistribution>,
}

/// Trailing time-window means over moving samples.
///
/// Each sample covers its own duration. A mean is emitted only once the
/// window spans at least `window_seconds`.
pub fn rolling_means(
    values: &[f64],
    durations: &[f64],
    moving: &[bool],
    window_seconds: f64,
) -> Vec<f64> {
    let mut window: VecDeque<(f64, f64)> = VecDeque::new();
    let mut weighted = 0.0;
    let mut span = 0.0;
    let mut rolled = Vec::new();

    for ((&value, &dt), &is_moving) in values.iter().zip(durations).zip(moving) {
        if !is_moving {
            continue;
        }
        window.push_back((value, dt));
        weighted += value * dt;
        span += dt;

        while let Some(&(old_value, old_dt)) = window.front() {
            if span - old_dt < window_seconds {
                break;
            }
            window.pop_front();
            weighted -= old_value * old_dt;
            span -= old_dt;
        }

        if span >= window_seconds {
            rolled.push(weighted / span);
        }
    }

    rolled
}

/// Fourth-power mean of the rolled averages.
pub fn weighted_power(rolled: &[f64]) -> Option<f64> {
    if rolled.is_empty() {
        return None;
    }
    let mean = rolled.iter().map(|p| p.powi(4)).sum::<f64>() / rolled.len() as f64;
    Some(mean.powf(0.25))
}

/// Analyze a power channel over the moving samples.
pub fn analyze(
    prepared: &PreparedStream,
    channel: &PowerChannel,
    settings: &PowerSettings,
    config: &AnalysisConfig,
    zones: Option<&ZoneSet>,
) -> Option<PowerData> {
    let watts: &[f64] = &channel.values;
    if watts.is_empty() {
        return None;
    }

    let avg = trapezoidal_mean(watts, &prepared.durations, &prepared.moving);
    let moving_watts = moving_values(watts, &prepared.moving);
    let summary = summarize(&moving_watts);
    let max = moving_watts.iter().copied().reduce(f64::max);

    let rolled = rolling_means(
        watts,
        &prepared.durations,
        &prepared.moving,
        config.power_window_seconds,
    );
    let weighted = weighted_power(&rolled).or(settings.fallback_weighted_power);

    let per_kg = |w: Option<f64>| {
        w.filter(|_| settings.weight > 0.0)
            .map(|w| w / settings.weight)
    };
    let variability_index = match (weighted, avg) {
        (Some(wp), Some(avg)) if avg > 0.0 => Some(wp / avg),
        _ => None,
    };
    let punch_factor = match (weighted, settings.ftp) {
        (Some(wp), Some(ftp)) => ratio(wp, ftp),
        _ => None,
    };

    debug!(
        "[Power] source {:?}, avg {:?} W, weighted {:?} W from {} rolled values",
        channel.source,
        avg,
        weighted,
        rolled.len()
    );

    Some(PowerData {
        has_power_meter: settings.has_power_meter,
        is_estimated_running_power: channel.source == PowerSource::RunningModel,
        power_source: channel.source,
        avg_watts: avg,
        avg_watts_per_kg: per_kg(avg),
        max_watts: max,
        weighted_power: weighted,
        weighted_watts_per_kg: per_kg(weighted),
        variability_index,
        punch_factor,
        lower_quartile_watts: summary.lower_quartile,
        median_watts: summary.median,
        upper_quartile_watts: summary.upper_quartile,
        power_zones: zones.map(|z| prepared.zone_distribution(watts, z)),
    })
}
