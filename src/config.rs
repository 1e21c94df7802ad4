//! Model constants and analysis configuration.
//!
//! The constants are the fixed coefficients every analyzer uses. They are
//! collected into [`AnalysisConfig`], and a single immutable instance,
//! [`DEFAULT_CONFIG`], is shared by every computation in the process.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Speed (m/s) a sample must exceed to count as moving.
pub const MOVING_SPEED_THRESHOLD: f64 = 0.1;

/// Time gap (s) between two samples at or above which the recording is
/// considered paused.
pub const PAUSE_GAP_SECONDS: f64 = 30.0;

/// Altitude change (m) below which consecutive readings are treated as noise.
pub const ELEVATION_NOISE_THRESHOLD: f64 = 0.5;

/// Grade (%) above which a sample is uphill.
pub const GRADE_CLIMBING_LIMIT: f64 = 1.6;

/// Grade (%) below which a sample is downhill.
pub const GRADE_DOWNHILL_LIMIT: f64 = -1.6;

/// Rolling window (s) for weighted power.
pub const POWER_WINDOW_SECONDS: f64 = 30.0;

/// Process-wide default configuration.
pub static DEFAULT_CONFIG: Lazy<AnalysisConfig> = Lazy::new(AnalysisConfig::default);

/// Configuration for the analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Minimum speed for a sample to be moving, in m/s.
    /// Default: 0.1
    pub moving_speed_threshold: f64,

    /// Sample gap treated as a recording pause, in seconds.
    /// Default: 30.0
    pub pause_gap_seconds: f64,

    /// Smallest consecutive altitude step counted as ascent/descent, in meters.
    /// Default: 0.5
    pub elevation_noise_threshold: f64,

    /// Uphill grade limit in percent.
    /// Default: 1.6
    pub grade_climbing_limit: f64,

    /// Downhill grade limit in percent (negative).
    /// Default: -1.6
    pub grade_downhill_limit: f64,

    /// Weighted power rolling window, in seconds.
    /// Default: 30.0
    pub power_window_seconds: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            moving_speed_threshold: MOVING_SPEED_THRESHOLD,
            pause_gap_seconds: PAUSE_GAP_SECONDS,
            elevation_noise_threshold: ELEVATION_NOISE_THRESHOLD,
            grade_climbing_limit: GRADE_CLIMBING_LIMIT,
            grade_downhill_limit: GRADE_DOWNHILL_LIMIT,
            power_window_seconds: POWER_WINDOW_SECONDS,
        }
    }
}

impl AnalysisConfig {
    /// Check that every constant is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pauseGapSeconds", self.pause_gap_seconds),
            ("elevationNoiseThreshold", self.elevation_noise_threshold),
            ("powerWindowSeconds", self.power_window_seconds),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::ConfigError {
                    message: format!("{} must be positive, got {}", name, value),
                });
            }
        }

        if !self.moving_speed_threshold.is_finite() || self.moving_speed_threshold < 0.0 {
            return Err(AnalysisError::ConfigError {
                message: format!(
                    "movingSpeedThreshold must be non-negative, got {}",
                    self.moving_speed_threshold
                ),
            });
        }

        if !self.grade_climbing_limit.is_finite()
            || !self.grade_downhill_limit.is_finite()
            || self.grade_downhill_limit > self.grade_climbing_limit
        {
            return Err(AnalysisError::ConfigError {
                message: format!(
                    "gradeDownhillLimit {} must not exceed gradeClimbingLimit {}",
                    self.grade_downhill_limit, self.grade_climbing_limit
                ),
            });
        }

        Ok(())
    }
}
