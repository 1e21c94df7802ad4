//! Running power estimation for runs recorded without a power meter.
//!
//! Power is modelled as `P = η · Cr · m · v`: the metabolic cost of running
//! on flat ground scaled by mechanical efficiency. Grade adjusted distance
//! already folds the slope into `v`, so no further terrain term is applied.
//! Wind and surface are ignored; the model is accurate to about ±10 W on an
//! activity average.

use crate::error::{AnalysisError, Result};

/// Energy cost of running, J·kg⁻¹·m⁻¹.
pub const RUNNING_METABOLIC_COST: f64 = 3.9;

/// Share of metabolic energy turned into mechanical work.
pub const RUNNING_EFFICIENCY: f64 = 0.242;

/// Instantaneous power in watts at `speed` m/s.
pub fn running_power_at_speed(weight_kg: f64, speed: f64) -> f64 {
    RUNNING_EFFICIENCY * RUNNING_METABOLIC_COST * weight_kg * speed
}

/// Average power for a run of `total_meters` in `total_seconds`.
///
/// Returns `None` for non-positive weight or time.
///
/// # Example
/// ```
/// use activity_computer::estimate_running_power;
/// assert_eq!(estimate_running_power(54.32, 6900.0, 2388.0), Some(148));
/// ```
pub fn estimate_running_power(weight_kg: f64, total_meters: f64, total_seconds: f64) -> Option<u32> {
    if weight_kg <= 0.0 || total_seconds <= 0.0 || total_meters < 0.0 {
        return None;
    }
    let watts = running_power_at_speed(weight_kg, total_meters / total_seconds);
    watts.is_finite().then(|| watts.round() as u32)
}

/// Per-sample estimated power from grade adjusted distance.
///
/// # Arguments
/// * `weight_kg` - Athlete weight
/// * `grade_adjusted_distance` - Cumulative grade adjusted meters
/// * `time` - Seconds since start, same length
///
/// Samples without elapsed time repeat the previous value. The first sample
/// takes the first computable value.
pub fn create_running_power_estimation_stream(
    weight_kg: f64,
    grade_adjusted_distance: &[f64],
    time: &[f64],
) -> Result<Vec<f64>> {
    if grade_adjusted_distance.len() != time.len() {
        return Err(AnalysisError::ChannelLengthMismatch {
            channel: "grade_adjusted_distance",
            expected: time.len(),
            actual: grade_adjusted_distance.len(),
        });
    }
    if time.is_empty() {
        return Ok(Vec::new());
    }

    let mut power = Vec::with_capacity(time.len());
    power.push(0.0);
    let mut first_computed: Option<f64> = None;

    for i in 1..time.len() {
        let dt = time[i] - time[i - 1];
        let value = if dt > 0.0 {
            let speed = ((grade_adjusted_distance[i] - grade_adjusted_distance[i - 1]) / dt).max(0.0);
            let watts = running_power_at_speed(weight_kg, speed);
            first_computed.get_or_insert(watts);
            watts
        } else {
            power[i - 1]
        };
        power.push(value);
    }

    power[0] = first_computed.unwrap_or(0.0);
    Ok(power)
}
