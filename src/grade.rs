//! Terrain profile and up/flat/down split.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::preprocess::PreparedStream;
use crate::statistics::{moving_values, ratio, summarize};
use crate::zones::{ZoneDistribution, ZoneSet};

/// Overall terrain classification, in ascending order of difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GradeProfile {
    Flat,
    Rolling,
    Hilly,
    Mountainous,
}

impl GradeProfile {
    /// Classify from mean absolute grade and grade variance (both in %).
    pub fn classify(mean_abs_grade: f64, variance: f64) -> Self {
        if mean_abs_grade >= 4.5 || variance >= 30.0 {
            GradeProfile::Mountainous
        } else if mean_abs_grade >= 1.75 || variance >= 6.0 {
            GradeProfile::Hilly
        } else if mean_abs_grade >= 1.0 || variance >= 2.0 {
            GradeProfile::Rolling
        } else {
            GradeProfile::Flat
        }
    }
}

/// A quantity split by terrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UpFlatDown<T> {
    pub up: T,
    pub flat: T,
    pub down: T,
}

/// [`UpFlatDown`] with the sum of its buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UpFlatDownTotal {
    pub up: f64,
    pub flat: f64,
    pub down: f64,
    pub total: f64,
}

impl From<UpFlatDown<f64>> for UpFlatDownTotal {
    fn from(split: UpFlatDown<f64>) -> Self {
        Self {
            up: split.up,
            flat: split.flat,
            down: split.down,
            total: split.up + split.flat + split.down,
        }
    }
}

impl UpFlatDown<f64> {
    fn bucket_mut(&mut self, grade: f64, config: &AnalysisConfig) -> &mut f64 {
        if grade > config.grade_climbing_limit {
            &mut self.up
        } else if grade < config.grade_downhill_limit {
            &mut self.down
        } else {
            &mut self.flat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeData {
    pub avg_grade: Option<f64>,
    pub lower_quartile_grade: Option<f64>,
    pub median_grade: Option<f64>,
    pub upper_quartile_grade: Option<f64>,
    pub grade_profile: GradeProfile,
    /// Seconds per bucket
    pub up_flat_down_in_seconds: UpFlatDownTotal,
    /// Kilometers per bucket
    pub up_flat_down_distance_data: UpFlatDownTotal,
    /// Average km/h per bucket
    pub up_flat_down_move_data: UpFlatDown<Option<f64>>,
    pub grade_zones: Option<ZoneDistribution>,
}

/// Analyze the grade channel.
///
/// `None` when the channel is absent or the activity is on a trainer.
pub fn analyze(
    prepared: &PreparedStream,
    is_trainer: bool,
    config: &AnalysisConfig,
    zones: Option<&ZoneSet>,
) -> Option<GradeData> {
    if prepared.grade.is_empty() || is_trainer {
        return None;
    }

    let grades = moving_values(prepared.grade, &prepared.moving);
    let summary = summarize(&grades);
    let mean_abs = if grades.is_empty() {
        0.0
    } else {
        grades.iter().map(|g| g.abs()).sum::<f64>() / grades.len() as f64
    };
    let profile = GradeProfile::classify(mean_abs, summary.variance.unwrap_or(0.0));

    let mut seconds = UpFlatDown::<f64>::default();
    let mut meters = UpFlatDown::<f64>::default();
    for i in prepared.moving_indices() {
        let grade = prepared.grade[i];
        *seconds.bucket_mut(grade, config) += prepared.durations[i];
        *meters.bucket_mut(grade, config) += prepared.sample_distance(i);
    }

    // km/h from meters and seconds
    let speed = |m: f64, s: f64| ratio(m, s).map(|v| v * 3.6);
    let move_data = UpFlatDown {
        up: speed(meters.up, seconds.up),
        flat: speed(meters.flat, seconds.flat),
        down: speed(meters.down, seconds.down),
    };
    let kilometers = UpFlatDown {
        up: meters.up / 1000.0,
        flat: meters.flat / 1000.0,
        down: meters.down / 1000.0,
    };

    debug!(
        "[Grade] profile {:?}, mean |g| {:.2}, up/flat/down {:.0}/{:.0}/{:.0} s",
        profile,
        mean_abs,
        seconds.up,
        seconds.flat,
        seconds.down
    );

    Some(GradeData {
        avg_grade: summary.mean,
        lower_quartile_grade: summary.lower_quartile,
        median_grade: summary.median,
        upper_quartile_grade: summary.upper_quartile,
        grade_profile: profile,
        up_flat_down_in_seconds: seconds.into(),
        up_flat_down_distance_data: kilometers.into(),
        up_flat_down_move_data: move_data,
        grade_zones: zones.map(|z| prepared.zone_distribution(prepared.grade, z)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use crate::preprocess::prepare;
    use crate::types::ActivityStream;

    fn stream() -> ActivityStream {
        ActivityStream {
            time: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            distance: vec![0.0, 4.0, 8.0, 18.0, 28.0, 28.0],
            velocity_smooth: vec![0.0, 4.0, 4.0, 10.0, 10.0, 0.0],
            grade_smooth: vec![0.0, 5.0, 5.0, -4.0, 0.5, 0.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_profile_thresholds() {
        assert_eq!(GradeProfile::classify(0.5, 1.0), GradeProfile::Flat);
        assert_eq!(GradeProfile::classify(1.2, 1.0), GradeProfile::Rolling);
        assert_eq!(GradeProfile::classify(0.2, 7.0), GradeProfile::Hilly);
        assert_eq!(GradeProfile::classify(5.0, 0.0), GradeProfile::Mountainous);
        assert!(GradeProfile::Flat < GradeProfile::Mountainous);
    }

    #[test]
    fn test_up_flat_down_closure() {
        let s = stream();
        let prepared = prepare(&s, None, false, &DEFAULT_CONFIG).unwrap();
        let data = analyze(&prepared, false, &DEFAULT_CONFIG, None).unwrap();

        let secs = data.up_flat_down_in_seconds;
        assert_eq!((secs.up, secs.flat, secs.down), (2.0, 1.0, 1.0));
        assert_eq!(secs.total, prepared.moving_time());

        let km = data.up_flat_down_distance_data;
        assert!((km.up - 0.008).abs() < 1e-12);
        assert!((km.down - 0.010).abs() < 1e-12);
        assert!((km.total * 1000.0 - prepared.moving_distance()).abs() < 1e-9);

        let speeds = data.up_flat_down_move_data;
        assert!((speeds.up.unwrap() - 14.4).abs() < 1e-9);
        assert!((speeds.down.unwrap() - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_bucket_speed_is_none() {
        let mut s = stream();
        s.grade_smooth = vec![0.0; 6];
        let prepared = prepare(&s, None, false, &DEFAULT_CONFIG).unwrap();
        let data = analyze(&prepared, false, &DEFAULT_CONFIG, None).unwrap();

        assert_eq!(data.up_flat_down_move_data.up, None);
        assert_eq!(data.up_flat_down_move_data.down, None);
        assert!(data.up_flat_down_move_data.flat.is_some());
        assert_eq!(data.grade_profile, GradeProfile::Flat);
    }

    #[test]
    fn test_trainer_has_no_grade() {
        let s = stream();
        let prepared = prepare(&s, None, true, &DEFAULT_CONFIG).unwrap();
        assert!(analyze(&prepared, true, &DEFAULT_CONFIG, None).is_none());
    }

    #[test]
    fn test_profile_serializes_uppercase() {
        let json = serde_json::to_string(&GradeProfile::Hilly).unwrap();
        assert_eq!(json, "\"HILLY\"");
    }
}
