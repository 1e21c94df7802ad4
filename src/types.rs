//! Input data model: activity stream, athlete settings, provider stats.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::zones::Zone;

/// Per-sample sensor channels of one activity.
///
/// All channels are index-aligned on `time`. A channel is either fully
/// present or empty; empty channels make the matching analysis section
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityStream {
    /// Seconds since start
    pub time: Vec<f64>,
    /// Cumulative meters
    pub distance: Vec<f64>,
    /// Meters
    pub altitude: Vec<f64>,
    /// Beats per minute
    #[serde(rename = "heartrate", alias = "heartRate")]
    pub heart_rate: Vec<f64>,
    /// Watts from a power meter
    pub watts: Vec<f64>,
    /// Watts estimated by the provider
    #[serde(rename = "watts_calc", alias = "wattsCalc")]
    pub watts_calc: Vec<f64>,
    /// Revolutions (or steps) per minute
    pub cadence: Vec<f64>,
    /// Percent
    #[serde(rename = "grade_smooth", alias = "gradeSmooth")]
    pub grade_smooth: Vec<f64>,
    /// Meters per second
    #[serde(rename = "velocity_smooth", alias = "velocitySmooth")]
    pub velocity_smooth: Vec<f64>,
    /// Cumulative meters adjusted for the cost of slope
    #[serde(rename = "grade_adjusted_distance", alias = "gradeAdjustedDistance")]
    pub grade_adjusted_distance: Vec<f64>,
}

impl ActivityStream {
    /// Number of samples on the time base.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// All channels with their wire names, time first.
    pub fn channels(&self) -> [(&'static str, &[f64]); 10] {
        [
            ("time", self.time.as_slice()),
            ("distance", self.distance.as_slice()),
            ("altitude", self.altitude.as_slice()),
            ("heartrate", self.heart_rate.as_slice()),
            ("watts", self.watts.as_slice()),
            ("watts_calc", self.watts_calc.as_slice()),
            ("cadence", self.cadence.as_slice()),
            ("grade_smooth", self.grade_smooth.as_slice()),
            ("velocity_smooth", self.velocity_smooth.as_slice()),
            ("grade_adjusted_distance", self.grade_adjusted_distance.as_slice()),
        ]
    }

    /// Check that every present channel shares the time channel's length.
    ///
    /// A stream without a time base has nothing to align and always passes;
    /// it yields an empty analysis.
    pub fn validate(&self) -> Result<()> {
        let expected = self.time.len();
        if expected == 0 {
            return Ok(());
        }
        for (channel, values) in self.channels() {
            if !values.is_empty() && values.len() != expected {
                return Err(AnalysisError::ChannelLengthMismatch {
                    channel,
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }
}

/// Athlete gender, selecting the TRIMP weighting coefficient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    #[serde(alias = "male")]
    Men,
    #[serde(alias = "female")]
    Women,
}

/// Athlete-configured zone lists. Any list may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneSettings {
    pub heart_rate: Option<Vec<Zone>>,
    pub power: Option<Vec<Zone>>,
    pub running_power: Option<Vec<Zone>>,
    pub speed: Option<Vec<Zone>>,
    pub pace: Option<Vec<Zone>>,
    pub cadence: Option<Vec<Zone>>,
    pub grade: Option<Vec<Zone>>,
    pub elevation: Option<Vec<Zone>>,
}

/// Athlete physiological settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteSettings {
    /// Kilograms
    pub weight: f64,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, alias = "restHR")]
    pub rest_hr: Option<f64>,
    #[serde(default, alias = "maxHR")]
    pub max_hr: Option<f64>,
    /// Cycling functional threshold power
    #[serde(default)]
    pub ftp: Option<f64>,
    /// Running functional threshold power
    #[serde(default)]
    pub running_ftp: Option<f64>,
    #[serde(default)]
    pub zones: ZoneSettings,
}

impl AthleteSettings {
    /// Settings with only the required weight.
    pub fn with_weight(weight: f64) -> Self {
        Self {
            weight,
            ..Default::default()
        }
    }
}

/// Aggregates precomputed by the activity provider.
///
/// Read-only; consulted only as a fallback (weighted power) and for the
/// toughness score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsMap {
    /// Total elevation gain in meters
    pub elevation: Option<f64>,
    /// km/h
    pub average_speed: Option<f64>,
    pub avg_power: Option<f64>,
    pub weighted_power: Option<f64>,
}

/// Activity classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    Ride,
    Run,
    Other(String),
}

impl ActivityType {
    /// Parse a free-form activity type name.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "run" | "virtualrun" | "trailrun" | "running" => ActivityType::Run,
            "ride" | "virtualride" | "ebikeride" | "cycling" => ActivityType::Ride,
            _ => ActivityType::Other(name.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ActivityType::Run)
    }
}

impl From<String> for ActivityType {
    fn from(name: String) -> Self {
        ActivityType::from_name(&name)
    }
}

impl From<&str> for ActivityType {
    fn from(name: &str) -> Self {
        ActivityType::from_name(name)
    }
}

impl From<ActivityType> for String {
    fn from(activity_type: ActivityType) -> Self {
        match activity_type {
            ActivityType::Ride => "Ride".to_string(),
            ActivityType::Run => "Run".to_string(),
            ActivityType::Other(name) => name,
        }
    }
}
