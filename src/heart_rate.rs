//! Heart rate load: heart rate reserve and Banister TRIMP.
//!
//! TRIMP weights each minute by the fraction of heart rate reserve used,
//! with an exponential factor that differs between men (1.92) and women
//! (1.67):
//!
//! ```text
//! TRIMP = Σ dt/60 · HRR · 0.64 · e^(k · HRR)
//! HRR   = (HR - rest) / (max - rest)
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::preprocess::PreparedStream;
use crate::statistics::{moving_values, ratio, summarize, trapezoidal_mean};
use crate::types::Gender;
use crate::zones::{ZoneDistribution, ZoneSet};

/// TRIMP exponent for men.
pub const TRIMP_FACTOR_MEN: f64 = 1.92;

/// TRIMP exponent for women.
pub const TRIMP_FACTOR_WOMEN: f64 = 1.67;

/// TRIMP scaling constant.
const TRIMP_SCALE: f64 = 0.64;

/// Channels whose mean is below this are treated as absent (bpm).
const MIN_MEAN_HEART_RATE: f64 = 1.0;

impl Gender {
    /// Exponent applied to HRR in the TRIMP formula.
    pub fn trimp_factor(self) -> f64 {
        match self {
            Gender::Men => TRIMP_FACTOR_MEN,
            Gender::Women => TRIMP_FACTOR_WOMEN,
        }
    }
}

/// Resting and maximum heart rate of an athlete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateReserve {
    rest: f64,
    max: f64,
}

impl HeartRateReserve {
    /// `None` when either value is missing or `max <= rest`.
    pub fn new(rest: Option<f64>, max: Option<f64>) -> Option<Self> {
        match (rest, max) {
            (Some(rest), Some(max)) if max > rest => Some(Self { rest, max }),
            _ => None,
        }
    }

    /// Fraction of reserve used at `heart_rate`, clamped to `[0, 1]`.
    pub fn fraction(&self, heart_rate: f64) -> f64 {
        ((heart_rate - self.rest) / (self.max - self.rest)).clamp(0.0, 1.0)
    }
}

/// TRIMP contribution of `dt` seconds at `hrr`.
pub fn trimp_increment(dt: f64, hrr: f64, gender: Gender) -> f64 {
    dt / 60.0 * hrr * TRIMP_SCALE * (gender.trimp_factor() * hrr).exp()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateData {
    #[serde(rename = "TRIMP")]
    pub trimp: Option<f64>,
    #[serde(rename = "TRIMPPerHour")]
    pub trimp_per_hour: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub max_heart_rate: Option<f64>,
    pub lower_quartile_heart_rate: Option<f64>,
    pub median_heart_rate: Option<f64>,
    pub upper_quartile_heart_rate: Option<f64>,
    /// Mean reserve used, percent
    pub activity_heart_rate_reserve: Option<f64>,
    /// Peak reserve used, percent
    pub activity_heart_rate_reserve_max: Option<f64>,
    pub heart_rate_zones: Option<ZoneDistribution>,
}

/// Analyze the heart rate channel.
///
/// `None` when the channel is absent or reads zero throughout. TRIMP and
/// reserve fields are `None` without a usable rest/max pair.
pub fn analyze(
    prepared: &PreparedStream,
    rest_hr: Option<f64>,
    max_hr: Option<f64>,
    gender: Gender,
    zones: Option<&ZoneSet>,
) -> Option<HeartRateData> {
    let hr = prepared.heart_rate;
    if hr.is_empty() {
        return None;
    }
    let mean = hr.iter().sum::<f64>() / hr.len() as f64;
    if mean < MIN_MEAN_HEART_RATE {
        return None;
    }

    let moving_hr = moving_values(hr, &prepared.moving);
    let summary = summarize(&moving_hr);

    let mut trimp = None;
    let mut trimp_per_hour = None;
    let mut reserve = None;
    let mut reserve_max = None;

    if let Some(hrr) = HeartRateReserve::new(rest_hr, max_hr) {
        let mut total = 0.0;
        let mut fractions = Vec::new();
        for i in prepared.moving_indices() {
            let interval_hr = (hr[i] + hr[i - 1]) / 2.0;
            let fraction = hrr.fraction(interval_hr);
            total += trimp_increment(prepared.durations[i], fraction, gender);
            fractions.push(hrr.fraction(hr[i]));
        }

        trimp = Some(total);
        trimp_per_hour = ratio(total, prepared.moving_time() / 3600.0);
        reserve = summarize(&fractions).mean.map(|m| m * 100.0);
        reserve_max = fractions.iter().copied().reduce(f64::max).map(|m| m * 100.0);
    }

    debug!(
        "[HeartRate] TRIMP {:?}, reserve {:?}%",
        trimp,
        reserve
    );

    Some(HeartRateData {
        trimp,
        trimp_per_hour,
        average_heart_rate: trapezoidal_mean(hr, &prepared.durations, &prepared.moving),
        max_heart_rate: hr.iter().copied().reduce(f64::max),
        lower_quartile_heart_rate: summary.lower_quartile,
        median_heart_rate: summary.median,
        upper_quartile_heart_rate: summary.upper_quartile,
        activity_heart_rate_reserve: reserve,
        activity_heart_rate_reserve_max: reserve_max,
        heart_rate_zones: zones.map(|z| prepared.zone_distribution(hr, z)),
    })
}
