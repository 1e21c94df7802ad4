//! JSON request/response wrapper around [`ActivityComputer`].
//!
//! Hosts that exchange plain JSON strings call [`compute_analysis_json`]
//! with one request object and get the [`AnalysisResult`] back as JSON.

use log::info;
use serde::{Deserialize, Serialize};

use crate::computer::{ActivityComputer, AnalysisResult};
use crate::error::Result;
use crate::types::{ActivityStream, ActivityType, AthleteSettings, StatsMap};

/// Everything one analysis needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub activity_type: ActivityType,
    #[serde(default)]
    pub is_trainer: bool,
    pub athlete_settings: AthleteSettings,
    #[serde(default)]
    pub athlete_weight: Option<f64>,
    #[serde(default)]
    pub has_power_meter: bool,
    #[serde(default)]
    pub stats_map: StatsMap,
    pub stream: ActivityStream,
    /// `[start, end]` sample indices, end exclusive
    #[serde(default)]
    pub bounds: Option<(usize, usize)>,
    #[serde(default)]
    pub return_zones: bool,
}

impl AnalysisRequest {
    /// Run the analysis described by this request.
    pub fn compute(&self) -> Result<AnalysisResult> {
        let mut computer = ActivityComputer::new(
            self.activity_type.clone(),
            &self.athlete_settings,
            &self.stream,
        )
        .trainer(self.is_trainer)
        .has_power_meter(self.has_power_meter)
        .stats_map(&self.stats_map)
        .return_zones(self.return_zones);

        if let Some(weight) = self.athlete_weight {
            computer = computer.athlete_weight(weight);
        }
        if let Some((start, end)) = self.bounds {
            computer = computer.bounds(start, end);
        }

        computer.compute()
    }
}

/// Decode a JSON [`AnalysisRequest`], analyze it and encode the result.
///
/// Malformed JSON is reported as [`AnalysisError::InvalidRequest`](crate::AnalysisError::InvalidRequest).
pub fn compute_analysis_json(request: &str) -> Result<String> {
    let request: AnalysisRequest = serde_json::from_str(request)?;
    let result = request.compute()?;

    info!(
        "[Json] Analyzed {:?} activity with {} samples",
        request.activity_type,
        request.stream.len()
    );

    Ok(serde_json::to_string(&result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use serde_json::{json, Value};

    fn request() -> Value {
        json!({
            "activityType": "Ride",
            "isTrainer": false,
            "athleteSettings": { "weight": 70.0, "restHr": 45, "maxHr": 200, "ftp": 250 },
            "hasPowerMeter": true,
            "statsMap": { "elevation": 100.0, "avgPower": 200.0, "averageSpeed": 28.8 },
            "stream": {
                "time": (0..90).collect::<Vec<u32>>(),
                "velocity_smooth": vec![8.0; 90],
                "watts": vec![200.0; 90],
                "heartrate": vec![150.0; 90]
            },
            "returnZones": true
        })
    }

    #[test]
    fn test_round_trip() {
        let output = compute_analysis_json(&request().to_string()).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert!(value["speedData"]["genuineAvgSpeed"].as_f64().is_some());
        assert!(value["heartRateData"]["TRIMP"].as_f64().is_some());
        assert_eq!(value["powerData"]["powerSource"], "meter");
        assert!(value["toughnessScore"].as_f64().is_some());
        assert!(value["gradeData"].is_null());
        assert!(value["powerData"]["powerZones"]["zones"].is_array());
    }

    #[test]
    fn test_bounds_pair() {
        let mut req = request();
        req["bounds"] = json!([10, 40]);
        let decoded: AnalysisRequest = serde_json::from_value(req).unwrap();
        assert_eq!(decoded.bounds, Some((10, 40)));

        let mut inverted = request();
        inverted["bounds"] = json!([40, 10]);
        let err = compute_analysis_json(&inverted.to_string()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidBounds { .. }));
    }

    #[test]
    fn test_malformed_request() {
        let err = compute_analysis_json("{\"activityType\": ").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRequest { .. }));

        let missing_stream = json!({ "activityType": "Ride", "athleteSettings": { "weight": 70 } });
        let err = compute_analysis_json(&missing_stream.to_string()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRequest { .. }));
    }
}
