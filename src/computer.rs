//! Activity analysis orchestration.
//!
//! [`ActivityComputer`] prepares the stream once, picks a power channel,
//! then runs each section analyzer on the same read-only view. Sections are
//! independent of each other; with the `parallel` feature they run on the
//! rayon pool.
//!
//! ## Example
//! ```rust
//! use activity_computer::{ActivityComputer, ActivityStream, AthleteSettings};
//!
//! let stream = ActivityStream {
//!     time: (0..120).map(|t| t as f64).collect(),
//!     velocity_smooth: vec![8.0; 120],
//!     watts: vec![220.0; 120],
//!     ..Default::default()
//! };
//! let settings = AthleteSettings::with_weight(72.0);
//!
//! let result = ActivityComputer::new("Ride", &settings, &stream)
//!     .has_power_meter(true)
//!     .compute()
//!     .unwrap();
//! println!("Weighted power: {:?}", result.power_data.unwrap().weighted_power);
//! ```

use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::cadence::{self, CadenceData};
use crate::config::{AnalysisConfig, DEFAULT_CONFIG};
use crate::elevation::{self, ElevationData};
use crate::error::Result;
use crate::grade::{self, GradeData};
use crate::heart_rate::{self, HeartRateData};
use crate::movement::{self, PaceData, SpeedData};
use crate::power::{self, PowerData, PowerSettings};
use crate::preprocess::{prepare, PreparedStream};
use crate::types::{ActivityStream, ActivityType, AthleteSettings, StatsMap};
use crate::zones::{Zone, ZoneSet};

/// Provider stats used when the caller supplies none.
static EMPTY_STATS_MAP: Lazy<StatsMap> = Lazy::new(StatsMap::default);

/// Full analysis of one activity window.
///
/// Each section is independently `None` when its channel is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub move_ratio: Option<f64>,
    pub toughness_score: Option<f64>,
    pub speed_data: Option<SpeedData>,
    pub pace_data: Option<PaceData>,
    pub power_data: Option<PowerData>,
    pub heart_rate_data: Option<HeartRateData>,
    pub cadence_data: Option<CadenceData>,
    pub grade_data: Option<GradeData>,
    pub elevation_data: Option<ElevationData>,
}

/// Zone sets requested for this computation, validated up front.
#[derive(Debug, Clone, Default)]
struct ResolvedZones {
    heart_rate: Option<ZoneSet>,
    power: Option<ZoneSet>,
    speed: Option<ZoneSet>,
    pace: Option<ZoneSet>,
    cadence: Option<ZoneSet>,
    grade: Option<ZoneSet>,
    elevation: Option<ZoneSet>,
}

fn configured(kind: &'static str, zones: Option<&[Zone]>) -> Result<Option<ZoneSet>> {
    zones
        .map(|z| ZoneSet::validated(kind, z.to_vec()))
        .transpose()
}

/// Toughness score from provider totals.
///
/// `sqrt(sqrt(elevation² · power · speed² · moveRatio⁴))`; `None` when an
/// input is missing or the product is negative.
pub fn toughness_score(stats: &StatsMap, move_ratio: Option<f64>) -> Option<f64> {
    let elevation = stats.elevation?;
    let power = stats.avg_power?;
    let speed = stats.average_speed?;
    let ratio = move_ratio?;

    let score = (elevation.powi(2) * power * speed.powi(2) * ratio.powi(4))
        .sqrt()
        .sqrt();
    score.is_finite().then_some(score)
}

/// Analyzes one activity.
///
/// Built with [`ActivityComputer::new`] and configured with chained setters.
/// Inputs are borrowed; [`compute`](Self::compute) never mutates them and
/// returns the same result for the same inputs.
#[derive(Debug, Clone)]
pub struct ActivityComputer<'a> {
    activity_type: ActivityType,
    is_trainer: bool,
    settings: &'a AthleteSettings,
    athlete_weight: Option<f64>,
    has_power_meter: bool,
    stats_map: &'a StatsMap,
    stream: &'a ActivityStream,
    bounds: Option<(usize, usize)>,
    return_zones: bool,
    config: &'a AnalysisConfig,
}

impl<'a> ActivityComputer<'a> {
    pub fn new(
        activity_type: impl Into<ActivityType>,
        settings: &'a AthleteSettings,
        stream: &'a ActivityStream,
    ) -> Self {
        Self {
            activity_type: activity_type.into(),
            is_trainer: false,
            settings,
            athlete_weight: None,
            has_power_meter: false,
            stats_map: &EMPTY_STATS_MAP,
            stream,
            bounds: None,
            return_zones: false,
            config: &DEFAULT_CONFIG,
        }
    }

    /// Indoor activity (no grade section, speed not required to move).
    pub fn trainer(mut self, is_trainer: bool) -> Self {
        self.is_trainer = is_trainer;
        self
    }

    /// Weight for this activity, overriding the settings weight.
    pub fn athlete_weight(mut self, weight: f64) -> Self {
        self.athlete_weight = Some(weight);
        self
    }

    pub fn has_power_meter(mut self, has_power_meter: bool) -> Self {
        self.has_power_meter = has_power_meter;
        self
    }

    pub fn stats_map(mut self, stats_map: &'a StatsMap) -> Self {
        self.stats_map = stats_map;
        self
    }

    /// Restrict the analysis to samples `start..end`.
    pub fn bounds(mut self, start: usize, end: usize) -> Self {
        self.bounds = Some((start, end));
        self
    }

    /// Attach time-in-zone distributions to each section.
    pub fn return_zones(mut self, return_zones: bool) -> Self {
        self.return_zones = return_zones;
        self
    }

    pub fn config(mut self, config: &'a AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    fn weight(&self) -> f64 {
        self.athlete_weight.unwrap_or(self.settings.weight)
    }

    /// FTP matching the activity type.
    fn ftp(&self) -> Option<f64> {
        if self.activity_type.is_running() {
            self.settings.running_ftp.or(self.settings.ftp)
        } else {
            self.settings.ftp
        }
    }

    fn resolve_zones(&self) -> Result<ResolvedZones> {
        if !self.return_zones {
            return Ok(ResolvedZones::default());
        }
        let zones = &self.settings.zones;

        let heart_rate = match configured("heartRate", zones.heart_rate.as_deref())? {
            Some(set) => Some(set),
            None => self
                .settings
                .max_hr
                .filter(|&max| max > 0.0)
                .map(ZoneSet::heart_rate_from_max)
                .transpose()?,
        };

        let power_zones = if self.activity_type.is_running() {
            configured("runningPower", zones.running_power.as_deref())?
        } else {
            configured("power", zones.power.as_deref())?
        };
        let power = match power_zones {
            Some(set) => Some(set),
            None => self
                .ftp()
                .filter(|&ftp| ftp > 0.0)
                .map(ZoneSet::power_from_ftp)
                .transpose()?,
        };

        Ok(ResolvedZones {
            heart_rate,
            power,
            speed: configured("speed", zones.speed.as_deref())?,
            pace: configured("pace", zones.pace.as_deref())?,
            cadence: configured("cadence", zones.cadence.as_deref())?,
            grade: configured("grade", zones.grade.as_deref())?,
            elevation: configured("elevation", zones.elevation.as_deref())?,
        })
    }

    /// Run the analysis.
    ///
    /// Fails on an invalid config, zone list, channel length or window;
    /// no partial result is returned.
    pub fn compute(&self) -> Result<AnalysisResult> {
        self.config.validate()?;
        let zones = self.resolve_zones()?;
        let prepared = prepare(self.stream, self.bounds, self.is_trainer, self.config)?;
        let weight = self.weight();

        let channel = power::select_channel(
            &prepared,
            &self.activity_type,
            self.has_power_meter,
            weight,
        )?;
        let power_settings = PowerSettings {
            weight,
            ftp: self.ftp(),
            has_power_meter: self.has_power_meter,
            fallback_weighted_power: self.stats_map.weighted_power,
        };
        let move_ratio = prepared.move_ratio();

        debug!(
            "[ActivityComputer] {:?}, trainer={}, power={:?}, zones={}",
            self.activity_type,
            self.is_trainer,
            channel.as_ref().map(|c| c.source),
            self.return_zones
        );

        let sections = Sections {
            prepared: &prepared,
            computer: self,
            zones: &zones,
            channel: channel.as_ref(),
            power_settings: &power_settings,
            move_ratio,
        };

        #[cfg(feature = "parallel")]
        let ((elevation_data, grade_data), ((power_data, heart_rate_data), (movement, cadence_data))) =
            rayon::join(
                || rayon::join(|| sections.elevation(), || sections.grade()),
                || {
                    rayon::join(
                        || rayon::join(|| sections.power(), || sections.heart_rate()),
                        || rayon::join(|| sections.movement(), || sections.cadence()),
                    )
                },
            );

        #[cfg(not(feature = "parallel"))]
        let (elevation_data, grade_data, power_data, heart_rate_data, movement, cadence_data) = (
            sections.elevation(),
            sections.grade(),
            sections.power(),
            sections.heart_rate(),
            sections.movement(),
            sections.cadence(),
        );

        let (speed_data, pace_data) = match movement {
            Some((speed, pace)) => (Some(speed), Some(pace)),
            None => (None, None),
        };

        let result = AnalysisResult {
            move_ratio,
            toughness_score: toughness_score(self.stats_map, move_ratio),
            speed_data,
            pace_data,
            power_data,
            heart_rate_data,
            cadence_data,
            grade_data,
            elevation_data,
        };

        info!(
            "[ActivityComputer] Analyzed {} samples, moveRatio={:?}",
            prepared.len(),
            result.move_ratio
        );

        Ok(result)
    }
}

/// Shared inputs of the section analyzers.
struct Sections<'s, 'a> {
    prepared: &'s PreparedStream<'a>,
    computer: &'s ActivityComputer<'a>,
    zones: &'s ResolvedZones,
    channel: Option<&'s power::PowerChannel<'a>>,
    power_settings: &'s PowerSettings,
    move_ratio: Option<f64>,
}

impl Sections<'_, '_> {
    fn elevation(&self) -> Option<ElevationData> {
        elevation::analyze(
            self.prepared,
            self.computer.config,
            self.zones.elevation.as_ref(),
        )
    }

    fn grade(&self) -> Option<GradeData> {
        grade::analyze(
            self.prepared,
            self.computer.is_trainer,
            self.computer.config,
            self.zones.grade.as_ref(),
        )
    }

    fn power(&self) -> Option<PowerData> {
        let channel = self.channel?;
        power::analyze(
            self.prepared,
            channel,
            self.power_settings,
            self.computer.config,
            self.zones.power.as_ref(),
        )
    }

    fn heart_rate(&self) -> Option<HeartRateData> {
        let settings = self.computer.settings;
        heart_rate::analyze(
            self.prepared,
            settings.rest_hr,
            settings.max_hr,
            settings.gender,
            self.zones.heart_rate.as_ref(),
        )
    }

    fn movement(&self) -> Option<(SpeedData, PaceData)> {
        movement::analyze(
            self.prepared,
            self.move_ratio,
            self.zones.speed.as_ref(),
            self.zones.pace.as_ref(),
        )
    }

    fn cadence(&self) -> Option<CadenceData> {
        cadence::analyze(self.prepared, self.zones.cadence.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::types::ZoneSettings;

    fn stream(n: usize) -> ActivityStream {
        ActivityStream {
            time: (0..n).map(|i| i as f64).collect(),
            distance: (0..n).map(|i| i as f64 * 8.0).collect(),
            velocity_smooth: vec![8.0; n],
            watts: vec![200.0; n],
            heart_rate: vec![140.0; n],
            ..Default::default()
        }
    }

    #[test]
    fn test_toughness_score() {
        let stats = StatsMap {
            elevation: Some(400.0),
            avg_power: Some(200.0),
            average_speed: Some(30.0),
            ..Default::default()
        };
        let expected = (400.0f64.powi(2) * 200.0 * 900.0).sqrt().sqrt();
        assert!((toughness_score(&stats, Some(1.0)).unwrap() - expected).abs() < 1e-9);
        assert_eq!(toughness_score(&stats, None), None);
        assert_eq!(toughness_score(&StatsMap::default(), Some(1.0)), None);
    }

    #[test]
    fn test_sections_present() {
        let s = stream(120);
        let settings = AthleteSettings::with_weight(70.0);
        let result = ActivityComputer::new("Ride", &settings, &s)
            .has_power_meter(true)
            .compute()
            .unwrap();

        assert!(result.speed_data.is_some());
        assert!(result.pace_data.is_some());
        assert!(result.power_data.is_some());
        assert!(result.heart_rate_data.is_some());
        assert!(result.cadence_data.is_none());
        assert!(result.grade_data.is_none());
        assert!(result.elevation_data.is_none());
        assert!(result.toughness_score.is_none());
    }

    #[test]
    fn test_athlete_weight_overrides_settings() {
        let s = stream(120);
        let settings = AthleteSettings::with_weight(70.0);
        let result = ActivityComputer::new("Ride", &settings, &s)
            .athlete_weight(80.0)
            .compute()
            .unwrap();
        let power = result.power_data.unwrap();
        assert!((power.avg_watts_per_kg.unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_zones() {
        let s = stream(120);
        let settings = AthleteSettings {
            ftp: Some(250.0),
            max_hr: Some(190.0),
            ..AthleteSettings::with_weight(70.0)
        };
        let result = ActivityComputer::new("Ride", &settings, &s)
            .return_zones(true)
            .compute()
            .unwrap();

        let power_zones = result.power_data.unwrap().power_zones.unwrap();
        assert_eq!(power_zones.zones.len(), 7);
        // 200 W is 80% of FTP, zone 3
        assert!((power_zones.get_zone_percent(3) - 100.0).abs() < 1e-9);

        let hr_zones = result.heart_rate_data.unwrap().heart_rate_zones.unwrap();
        assert_eq!(hr_zones.zones.len(), 5);
    }

    #[test]
    fn test_zones_not_attached_unless_requested() {
        let s = stream(60);
        let settings = AthleteSettings {
            ftp: Some(250.0),
            ..AthleteSettings::with_weight(70.0)
        };
        let result = ActivityComputer::new("Ride", &settings, &s)
            .compute()
            .unwrap();
        assert!(result.power_data.unwrap().power_zones.is_none());
    }

    #[test]
    fn test_invalid_zones_abort() {
        let s = stream(60);
        let settings = AthleteSettings {
            zones: ZoneSettings {
                cadence: Some(vec![Zone::new(0.0, 50.0), Zone::new(60.0, 90.0)]),
                ..Default::default()
            },
            ..AthleteSettings::with_weight(70.0)
        };

        let err = ActivityComputer::new("Ride", &settings, &s)
            .return_zones(true)
            .compute()
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidZones { kind: "cadence", .. }));

        // ignored when zones are not requested
        assert!(ActivityComputer::new("Ride", &settings, &s).compute().is_ok());
    }

    #[test]
    fn test_invalid_config_aborts() {
        let s = stream(60);
        let settings = AthleteSettings::with_weight(70.0);
        let config = AnalysisConfig {
            pause_gap_seconds: -1.0,
            ..Default::default()
        };
        let result = ActivityComputer::new("Ride", &settings, &s)
            .config(&config)
            .compute();
        assert!(matches!(result, Err(AnalysisError::ConfigError { .. })));
    }

    #[test]
    fn test_running_ftp_used_for_runs() {
        let mut s = stream(120);
        s.grade_adjusted_distance = s.distance.clone();
        s.watts.clear();
        let settings = AthleteSettings {
            ftp: Some(250.0),
            running_ftp: Some(300.0),
            ..AthleteSettings::with_weight(60.0)
        };
        let result = ActivityComputer::new("Run", &settings, &s).compute().unwrap();
        let power = result.power_data.unwrap();

        assert!(power.is_estimated_running_power);
        let expected = power.weighted_power.unwrap() / 300.0;
        assert!((power.punch_factor.unwrap() - expected).abs() < 1e-9);
    }
}
