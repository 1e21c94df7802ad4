//! Time-in-zone distribution for any numeric channel.
//!
//! Zones are athlete-configured, variable-length lists of contiguous
//! `[from, to)` intervals. They are validated once, when a [`ZoneSet`] is
//! built, and trusted afterwards.
//!
//! ## Features
//! - Validated zone sets (ascending, contiguous, non-overlapping)
//! - Time-in-zone and percentage of moving time per zone
//! - Coverage gap reporting for samples outside every zone
//! - Default power zones from FTP (Coggan) and HR zones from max HR
//!
//! ## Example
//! ```rust
//! use activity_computer::zones::{distribute, ZoneSet};
//!
//! let watts = vec![0.0, 150.0, 200.0, 250.0, 300.0];
//! let durations = vec![0.0, 1.0, 1.0, 1.0, 1.0];
//! let moving = vec![false, true, true, true, true];
//! let zones = ZoneSet::power_from_ftp(250.0).unwrap();
//! let distribution = distribute(&watts, &durations, &moving, &zones);
//! println!("Time in Zone 4: {}%", distribution.get_zone_percent(4));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Standard Coggan power zone upper bounds as fractions of FTP (Z1..Z6).
/// Z7 runs from the last bound to [`POWER_ZONE_CEILING_FACTOR`] × FTP.
pub const COGGAN_POWER_THRESHOLDS: [f64; 6] = [0.55, 0.75, 0.90, 1.05, 1.20, 1.50];

/// Upper bound of the last derived power zone, as a multiple of FTP.
pub const POWER_ZONE_CEILING_FACTOR: f64 = 10.0;

/// Standard HR zone upper bounds as fractions of max HR (Z1..Z4).
/// Z5 runs up to max HR.
pub const MAX_HR_THRESHOLDS: [f64; 4] = [0.60, 0.70, 0.80, 0.90];

/// Below this sample count the parallel distribution is not worth it.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_SAMPLES: usize = 10_000;

#[cfg(feature = "parallel")]
const PARALLEL_CHUNK_SIZE: usize = 4_096;

/// A single `[from, to)` zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub from: f64,
    pub to: f64,
}

impl Zone {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }
}

/// An ordered, validated list of contiguous zones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    /// Validate and wrap a zone list.
    ///
    /// Fails when the list is empty, a zone has `from >= to`, or a zone
    /// does not start where the previous one ends.
    pub fn new(zones: Vec<Zone>) -> Result<Self> {
        Self::validated("custom", zones)
    }

    /// Validate a zone list, naming it `kind` in errors.
    pub fn validated(kind: &'static str, zones: Vec<Zone>) -> Result<Self> {
        if zones.is_empty() {
            return Err(AnalysisError::InvalidZones {
                kind,
                message: "no zones configured".to_string(),
            });
        }

        for (i, zone) in zones.iter().enumerate() {
            if !zone.from.is_finite() || !zone.to.is_finite() || zone.from >= zone.to {
                return Err(AnalysisError::InvalidZones {
                    kind,
                    message: format!("zone {} is empty or inverted ({} to {})", i + 1, zone.from, zone.to),
                });
            }
            if i > 0 && zones[i - 1].to != zone.from {
                return Err(AnalysisError::InvalidZones {
                    kind,
                    message: format!(
                        "zone {} starts at {} but zone {} ends at {}",
                        i + 1,
                        zone.from,
                        i,
                        zones[i - 1].to
                    ),
                });
            }
        }

        Ok(Self { zones })
    }

    /// Standard 7-zone Coggan power model from FTP.
    pub fn power_from_ftp(ftp: f64) -> Result<Self> {
        let mut bounds = vec![0.0];
        bounds.extend(COGGAN_POWER_THRESHOLDS.iter().map(|t| t * ftp));
        bounds.push(POWER_ZONE_CEILING_FACTOR * ftp);
        Self::validated("power", zones_from_bounds(&bounds))
    }

    /// Standard 5-zone heart rate model from max HR.
    pub fn heart_rate_from_max(max_hr: f64) -> Result<Self> {
        let mut bounds = vec![0.0];
        bounds.extend(MAX_HR_THRESHOLDS.iter().map(|t| t * max_hr));
        bounds.push(max_hr);
        Self::validated("heartRate", zones_from_bounds(&bounds))
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Index of the zone containing `value`, if any.
    ///
    /// Zones are half-open except the last one, which includes its upper bound.
    pub fn zone_index(&self, value: f64) -> Option<usize> {
        let last = self.zones.len() - 1;
        // Zones are contiguous, so the first zone whose upper bound exceeds
        // the value is the only candidate.
        let idx = self.zones.partition_point(|z| z.to <= value);
        if idx <= last {
            (value >= self.zones[idx].from).then_some(idx)
        } else if value == self.zones[last].to {
            Some(last)
        } else {
            None
        }
    }
}

fn zones_from_bounds(bounds: &[f64]) -> Vec<Zone> {
    bounds.windows(2).map(|w| Zone::new(w[0], w[1])).collect()
}

/// Time accumulated in one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTime {
    pub from: f64,
    pub to: f64,
    /// Seconds spent in the zone
    pub seconds: f64,
    /// Share of total moving time, 0-100
    pub percent: f64,
}

/// Result of a zone distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDistribution {
    pub zones: Vec<ZoneTime>,
    /// Total moving seconds considered
    pub total_seconds: f64,
    /// Moving seconds whose value fell outside every zone
    pub uncovered_seconds: f64,
}

impl ZoneDistribution {
    /// Get percentage for a specific zone (1-based)
    pub fn get_zone_percent(&self, zone: usize) -> f64 {
        if zone >= 1 && zone <= self.zones.len() {
            self.zones[zone - 1].percent
        } else {
            0.0
        }
    }

    fn from_accumulated(zones: &ZoneSet, seconds: Vec<f64>, total: f64) -> Self {
        let covered: f64 = seconds.iter().sum();
        let zone_times = zones
            .zones()
            .iter()
            .zip(seconds)
            .map(|(zone, seconds)| ZoneTime {
                from: zone.from,
                to: zone.to,
                seconds,
                percent: if total > 0.0 { seconds / total * 100.0 } else { 0.0 },
            })
            .collect();

        Self {
            zones: zone_times,
            total_seconds: total,
            uncovered_seconds: (total - covered).max(0.0),
        }
    }
}

/// Per-zone seconds and total seconds of the moving samples in a chunk.
fn accumulate(
    values: &[f64],
    durations: &[f64],
    moving: &[bool],
    zones: &ZoneSet,
) -> (Vec<f64>, f64) {
    let mut seconds = vec![0.0; zones.len()];
    let mut total = 0.0;

    for ((&value, &dt), &is_moving) in values.iter().zip(durations).zip(moving) {
        if !is_moving {
            continue;
        }
        total += dt;
        if let Some(idx) = zones.zone_index(value) {
            seconds[idx] += dt;
        }
    }

    (seconds, total)
}

/// Accumulate moving time per zone.
///
/// # Arguments
/// * `values` - Channel values, one per sample
/// * `durations` - Seconds since the previous sample
/// * `moving` - Moving mask; only moving samples are counted
/// * `zones` - Validated zone set
pub fn distribute(
    values: &[f64],
    durations: &[f64],
    moving: &[bool],
    zones: &ZoneSet,
) -> ZoneDistribution {
    let (seconds, total) = accumulate(values, durations, moving, zones);
    ZoneDistribution::from_accumulated(zones, seconds, total)
}

/// Zone distribution using parallel processing.
/// More efficient for large datasets (> 10,000 samples).
///
/// Chunks are merged in order, so repeated calls give identical results.
#[cfg(feature = "parallel")]
pub fn distribute_parallel(
    values: &[f64],
    durations: &[f64],
    moving: &[bool],
    zones: &ZoneSet,
) -> ZoneDistribution {
    if values.len() < PARALLEL_MIN_SAMPLES {
        return distribute(values, durations, moving, zones);
    }

    let n = values.len().min(durations.len()).min(moving.len());
    let partials: Vec<(Vec<f64>, f64)> = values[..n]
        .par_chunks(PARALLEL_CHUNK_SIZE)
        .zip(durations[..n].par_chunks(PARALLEL_CHUNK_SIZE))
        .zip(moving[..n].par_chunks(PARALLEL_CHUNK_SIZE))
        .map(|((v, d), m)| accumulate(v, d, m, zones))
        .collect();

    let mut seconds = vec![0.0; zones.len()];
    let mut total = 0.0;
    for (chunk_seconds, chunk_total) in partials {
        for (a, b) in seconds.iter_mut().zip(chunk_seconds) {
            *a += b;
        }
        total += chunk_total;
    }

    ZoneDistribution::from_accumulated(zones, seconds, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(bounds: &[f64]) -> ZoneSet {
        ZoneSet::new(zones_from_bounds(bounds)).unwrap()
    }

    #[test]
    fn test_zone_index_half_open() {
        let set = zones(&[0.0, 100.0, 200.0, 300.0]);

        assert_eq!(set.zone_index(0.0), Some(0));
        assert_eq!(set.zone_index(99.9), Some(0));
        assert_eq!(set.zone_index(100.0), Some(1));
        assert_eq!(set.zone_index(300.0), Some(2)); // last zone inclusive
        assert_eq!(set.zone_index(300.1), None);
        assert_eq!(set.zone_index(-1.0), None);
    }

    #[test]
    fn test_rejects_gap_and_overlap() {
        let gap = ZoneSet::new(vec![Zone::new(0.0, 100.0), Zone::new(110.0, 200.0)]);
        assert!(matches!(gap, Err(AnalysisError::InvalidZones { .. })));

        let descending = ZoneSet::new(vec![Zone::new(100.0, 200.0), Zone::new(0.0, 100.0)]);
        assert!(descending.is_err());

        let inverted = ZoneSet::new(vec![Zone::new(50.0, 10.0)]);
        assert!(inverted.is_err());

        assert!(ZoneSet::new(vec![]).is_err());
    }

    #[test]
    fn test_power_zones_from_ftp() {
        let set = ZoneSet::power_from_ftp(200.0).unwrap();

        assert_eq!(set.len(), 7);
        assert_eq!(set.zone_index(100.0), Some(0)); // < 55% FTP
        assert_eq!(set.zone_index(130.0), Some(1)); // 55-75% FTP
        assert_eq!(set.zone_index(170.0), Some(2)); // 75-90% FTP
        assert_eq!(set.zone_index(200.0), Some(3)); // 90-105% FTP
        assert_eq!(set.zone_index(230.0), Some(4)); // 105-120% FTP
        assert_eq!(set.zone_index(280.0), Some(5)); // 120-150% FTP
        assert_eq!(set.zone_index(350.0), Some(6)); // > 150% FTP
    }

    #[test]
    fn test_heart_rate_zones_from_max() {
        let set = ZoneSet::heart_rate_from_max(200.0).unwrap();

        assert_eq!(set.len(), 5);
        assert_eq!(set.zone_index(110.0), Some(0));
        assert_eq!(set.zone_index(150.0), Some(2));
        assert_eq!(set.zone_index(200.0), Some(4));
        assert_eq!(set.zone_index(205.0), None);
    }

    #[test]
    fn test_distribution_with_gap() {
        let set = zones(&[100.0, 200.0, 300.0]);
        let values = vec![0.0, 150.0, 250.0, 250.0, 50.0, 999.0];
        let durations = vec![0.0, 1.0, 2.0, 1.0, 1.0, 5.0];
        let moving = vec![false, true, true, true, true, false];

        let result = distribute(&values, &durations, &moving, &set);

        assert_eq!(result.total_seconds, 5.0);
        assert_eq!(result.zones[0].seconds, 1.0);
        assert_eq!(result.zones[1].seconds, 3.0);
        assert_eq!(result.uncovered_seconds, 1.0);
        assert!((result.get_zone_percent(2) - 60.0).abs() < 1e-9);
        assert_eq!(result.get_zone_percent(9), 0.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let set = ZoneSet::power_from_ftp(250.0).unwrap();
        let values: Vec<f64> = (0..25_000).map(|i| (i % 400) as f64).collect();
        let durations = vec![1.0; values.len()];
        let moving: Vec<bool> = (0..values.len()).map(|i| i % 7 != 0).collect();

        let sequential = distribute(&values, &durations, &moving, &set);
        let parallel = distribute_parallel(&values, &durations, &moving, &set);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_empty_data() {
        let set = zones(&[0.0, 10.0]);
        let result = distribute(&[], &[], &[], &set);

        assert_eq!(result.total_seconds, 0.0);
        assert_eq!(result.zones[0].percent, 0.0);
    }
}
