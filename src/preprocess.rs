//! Stream windowing and moving/paused classification.
//!
//! Every analyzer works on a [`PreparedStream`]: the raw channels sliced to
//! the requested window, plus per-sample durations and the moving mask.
//! Slices borrow the caller's stream; nothing is copied except the two
//! derived vectors.

use log::debug;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::statistics::ratio;
use crate::types::ActivityStream;
use crate::zones::{ZoneDistribution, ZoneSet};

/// A bounded, classified view of an [`ActivityStream`].
#[derive(Debug, Clone)]
pub struct PreparedStream<'a> {
    pub time: &'a [f64],
    pub distance: &'a [f64],
    pub altitude: &'a [f64],
    pub heart_rate: &'a [f64],
    pub watts: &'a [f64],
    pub watts_calc: &'a [f64],
    pub cadence: &'a [f64],
    pub grade: &'a [f64],
    pub velocity: &'a [f64],
    pub grade_adjusted_distance: &'a [f64],
    /// Seconds since the previous sample (`durations[0] == 0`)
    pub durations: Vec<f64>,
    /// Whether each sample counts as moving
    pub moving: Vec<bool>,
}

/// Slice one channel to the window, keeping absent channels empty.
fn window(values: &[f64], start: usize, end: usize) -> &[f64] {
    if values.is_empty() {
        values
    } else {
        &values[start..end]
    }
}

/// Clamp `(start, end)` to the stream and reject inverted windows.
pub fn clamp_bounds(bounds: Option<(usize, usize)>, len: usize) -> Result<(usize, usize)> {
    let (start, end) = match bounds {
        Some((start, end)) => (start.min(len), end.min(len)),
        None => (0, len),
    };
    if start > end {
        return Err(AnalysisError::InvalidBounds { start, end, len });
    }
    Ok((start, end))
}

/// Validate, window and classify a stream.
///
/// # Arguments
/// * `stream` - Raw activity stream
/// * `bounds` - Optional `(start, end)` sample indices, end exclusive
/// * `is_trainer` - Indoor activity; the speed criterion is waived
/// * `config` - Model constants
pub fn prepare<'a>(
    stream: &'a ActivityStream,
    bounds: Option<(usize, usize)>,
    is_trainer: bool,
    config: &AnalysisConfig,
) -> Result<PreparedStream<'a>> {
    stream.validate()?;
    let (start, end) = clamp_bounds(bounds, stream.len())?;

    let mut prepared = PreparedStream {
        time: window(&stream.time, start, end),
        distance: window(&stream.distance, start, end),
        altitude: window(&stream.altitude, start, end),
        heart_rate: window(&stream.heart_rate, start, end),
        watts: window(&stream.watts, start, end),
        watts_calc: window(&stream.watts_calc, start, end),
        cadence: window(&stream.cadence, start, end),
        grade: window(&stream.grade_smooth, start, end),
        velocity: window(&stream.velocity_smooth, start, end),
        grade_adjusted_distance: window(&stream.grade_adjusted_distance, start, end),
        durations: Vec::new(),
        moving: Vec::new(),
    };

    prepared.durations = durations(prepared.time);
    prepared.moving = (0..prepared.len())
        .map(|i| prepared.classify(i, is_trainer, config))
        .collect();

    debug!(
        "[Preprocess] window {}..{} of {}, {} moving samples",
        start,
        end,
        stream.len(),
        prepared.moving.iter().filter(|&&m| m).count()
    );

    Ok(prepared)
}

/// Seconds between consecutive samples, `0` for the first.
pub fn durations(time: &[f64]) -> Vec<f64> {
    let mut result = Vec::with_capacity(time.len());
    if !time.is_empty() {
        result.push(0.0);
    }
    result.extend(time.windows(2).map(|w| w[1] - w[0]));
    result
}

impl<'a> PreparedStream<'a> {
    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    fn classify(&self, i: usize, is_trainer: bool, config: &AnalysisConfig) -> bool {
        if i == 0 {
            return false;
        }
        let dt = self.durations[i];
        if !(dt > 0.0 && dt < config.pause_gap_seconds) {
            return false;
        }
        if is_trainer {
            return true;
        }
        match self.speed(i) {
            Some(speed) => speed > config.moving_speed_threshold,
            None => true,
        }
    }

    /// Speed at sample `i` in m/s, if the stream can tell.
    pub fn speed(&self, i: usize) -> Option<f64> {
        if !self.velocity.is_empty() {
            return Some(self.velocity[i]);
        }
        if !self.distance.is_empty() && i > 0 && self.durations[i] > 0.0 {
            return Some((self.distance[i] - self.distance[i - 1]) / self.durations[i]);
        }
        None
    }

    /// Meters covered during sample `i`.
    ///
    /// Uses the distance delta, or velocity times duration without a
    /// distance channel. Zero when neither channel exists.
    pub fn sample_distance(&self, i: usize) -> f64 {
        if i == 0 {
            return 0.0;
        }
        if !self.distance.is_empty() {
            self.distance[i] - self.distance[i - 1]
        } else if !self.velocity.is_empty() {
            self.velocity[i] * self.durations[i]
        } else {
            0.0
        }
    }

    /// Indices of moving samples.
    pub fn moving_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.moving
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| i)
    }

    /// Total seconds spent moving.
    pub fn moving_time(&self) -> f64 {
        self.moving_indices().map(|i| self.durations[i]).sum()
    }

    /// Total meters covered while moving.
    pub fn moving_distance(&self) -> f64 {
        self.moving_indices().map(|i| self.sample_distance(i)).sum()
    }

    /// Seconds between the first and last sample of the window.
    pub fn elapsed_time(&self) -> f64 {
        match (self.time.first(), self.time.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Moving time over elapsed time.
    pub fn move_ratio(&self) -> Option<f64> {
        ratio(self.moving_time(), self.elapsed_time())
    }

    /// Moving time per zone for a channel of this window.
    #[cfg(feature = "parallel")]
    pub fn zone_distribution(&self, values: &[f64], zones: &ZoneSet) -> ZoneDistribution {
        crate::zones::distribute_parallel(values, &self.durations, &self.moving, zones)
    }

    /// Moving time per zone for a channel of this window.
    #[cfg(not(feature = "parallel"))]
    pub fn zone_distribution(&self, values: &[f64], zones: &ZoneSet) -> ZoneDistribution {
        crate::zones::distribute(values, &self.durations, &self.moving, zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;

    fn stream() -> ActivityStream {
        ActivityStream {
            time: vec![0.0, 1.0, 2.0, 3.0, 63.0, 64.0],
            distance: vec![0.0, 5.0, 10.0, 10.0, 15.0, 20.0],
            velocity_smooth: vec![0.0, 5.0, 5.0, 0.0, 5.0, 5.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_moving_classification() {
        let s = stream();
        let prepared = prepare(&s, None, false, &DEFAULT_CONFIG).unwrap();

        // sample 3 is stopped, sample 4 follows a 60 s gap
        assert_eq!(prepared.moving, vec![false, true, true, false, false, true]);
        assert_eq!(prepared.durations, vec![0.0, 1.0, 1.0, 1.0, 60.0, 1.0]);
        assert_eq!(prepared.moving_time(), 3.0);
        assert_eq!(prepared.moving_distance(), 15.0);
        assert_eq!(prepared.elapsed_time(), 64.0);
        assert!((prepared.move_ratio().unwrap() - 3.0 / 64.0).abs() < 1e-12);
    }

    #[test]
    fn test_trainer_waives_speed() {
        let s = stream();
        let prepared = prepare(&s, None, true, &DEFAULT_CONFIG).unwrap();
        assert_eq!(prepared.moving, vec![false, true, true, true, false, true]);
    }

    #[test]
    fn test_speed_from_distance_without_velocity() {
        let mut s = stream();
        s.velocity_smooth.clear();
        let prepared = prepare(&s, None, false, &DEFAULT_CONFIG).unwrap();

        assert_eq!(prepared.speed(1), Some(5.0));
        assert_eq!(prepared.moving, vec![false, true, true, false, false, true]);
    }

    #[test]
    fn test_no_speed_channel_counts_every_regular_sample() {
        let s = ActivityStream {
            time: vec![0.0, 1.0, 2.0],
            heart_rate: vec![100.0, 100.0, 100.0],
            ..Default::default()
        };
        let prepared = prepare(&s, None, false, &DEFAULT_CONFIG).unwrap();
        assert_eq!(prepared.moving, vec![false, true, true]);
        assert_eq!(prepared.sample_distance(1), 0.0);
    }

    #[test]
    fn test_bounds() {
        let s = stream();

        let window = prepare(&s, Some((1, 3)), false, &DEFAULT_CONFIG).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window.time, &[1.0, 2.0]);
        assert_eq!(window.distance, &[5.0, 10.0]);

        let clamped = prepare(&s, Some((2, 1000)), false, &DEFAULT_CONFIG).unwrap();
        assert_eq!(clamped.len(), 4);

        let inverted = prepare(&s, Some((4, 2)), false, &DEFAULT_CONFIG);
        assert_eq!(
            inverted.unwrap_err(),
            AnalysisError::InvalidBounds {
                start: 4,
                end: 2,
                len: 6
            }
        );
    }

    #[test]
    fn test_full_bounds_match_no_bounds() {
        let s = stream();
        let full = prepare(&s, Some((0, s.len())), false, &DEFAULT_CONFIG).unwrap();
        let none = prepare(&s, None, false, &DEFAULT_CONFIG).unwrap();
        assert_eq!(full.moving, none.moving);
        assert_eq!(full.durations, none.durations);
    }

    #[test]
    fn test_empty_stream() {
        let s = ActivityStream::default();
        let prepared = prepare(&s, None, false, &DEFAULT_CONFIG).unwrap();
        assert!(prepared.is_empty());
        assert_eq!(prepared.move_ratio(), None);
    }

    #[test]
    fn test_zone_distribution_over_long_window() {
        // long enough for the chunked path under the parallel feature
        let n = 12_000;
        let s = ActivityStream {
            time: (0..n).map(|i| i as f64).collect(),
            velocity_smooth: (0..n).map(|i| if i % 50 < 5 { 0.0 } else { 4.0 }).collect(),
            heart_rate: (0..n).map(|i| 100.0 + (i % 90) as f64).collect(),
            ..Default::default()
        };
        let prepared = prepare(&s, None, false, &DEFAULT_CONFIG).unwrap();
        let zones = ZoneSet::heart_rate_from_max(190.0).unwrap();

        let expected = crate::zones::distribute(
            prepared.heart_rate,
            &prepared.durations,
            &prepared.moving,
            &zones,
        );
        let distribution = prepared.zone_distribution(prepared.heart_rate, &zones);
        assert_eq!(distribution, expected);
        assert_eq!(distribution.total_seconds, prepared.moving_time());
    }
}
