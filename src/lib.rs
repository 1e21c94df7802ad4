//! # Activity Computer
//!
//! Statistical analysis of recorded fitness activities.
//!
//! This library provides:
//! - Moving time detection and stream windowing
//! - Speed/pace, power, heart rate, cadence, grade and elevation sections
//! - Weighted power, TRIMP and heart rate reserve
//! - Running power estimation for runs without a power meter
//! - Time-in-zone distributions
//!
//! ## Features
//!
//! - **`parallel`** - Run the section analyzers on the rayon pool
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_computer::{ActivityComputer, ActivityStream, AthleteSettings};
//!
//! let stream = ActivityStream {
//!     time: vec![0.0, 1.0, 2.0, 3.0],
//!     velocity_smooth: vec![0.0, 9.0, 9.5, 9.2],
//!     heart_rate: vec![120.0, 130.0, 135.0, 138.0],
//!     ..Default::default()
//! };
//! let settings = AthleteSettings {
//!     rest_hr: Some(50.0),
//!     max_hr: Some(190.0),
//!     ..AthleteSettings::with_weight(70.0)
//! };
//!
//! let result = ActivityComputer::new("Ride", &settings, &stream).compute().unwrap();
//! if let Some(hr) = result.heart_rate_data {
//!     println!("TRIMP: {:?}", hr.trimp);
//! }
//! ```

// Unified error handling
pub mod error;
pub use error::{AnalysisError, Result};

// Model constants and configuration
pub mod config;
pub use config::{AnalysisConfig, DEFAULT_CONFIG};

// Input data model
pub mod types;
pub use types::{ActivityStream, ActivityType, AthleteSettings, Gender, StatsMap, ZoneSettings};

// Mean, percentiles and spread of a channel
pub mod statistics;
pub use statistics::{summarize, trapezoidal_mean, Summarize, Summary};

// Zone distribution calculations
pub mod zones;
#[cfg(feature = "parallel")]
pub use zones::distribute_parallel;
pub use zones::{distribute, Zone, ZoneDistribution, ZoneSet, ZoneTime};

// Windowing and moving/paused classification
pub mod preprocess;
pub use preprocess::{prepare, PreparedStream};

// Section analyzers
pub mod cadence;
pub mod elevation;
pub mod grade;
pub mod heart_rate;
pub mod movement;
pub mod power;
pub use cadence::CadenceData;
pub use elevation::{AscentSpeed, ElevationData};
pub use grade::{GradeData, GradeProfile, UpFlatDown, UpFlatDownTotal};
pub use heart_rate::HeartRateData;
pub use movement::{PaceData, SpeedData};
pub use power::{PowerChannel, PowerData, PowerSource};

// Running power model
pub mod running_power;
pub use running_power::{create_running_power_estimation_stream, estimate_running_power};

// Orchestration
pub mod computer;
pub use computer::{ActivityComputer, AnalysisResult};

// JSON request/response contract
pub mod json;
pub use json::{compute_analysis_json, AnalysisRequest};
