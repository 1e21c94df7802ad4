//! Unified error handling for the activity computer.
//!
//! Only conditions that make the whole analysis meaningless are errors.
//! A missing channel or a missing athlete setting is never an error: the
//! affected section (or field) is simply `None`.

use thiserror::Error;

/// Unified error type for activity analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Requested analysis window is inverted once clamped to the stream
    #[error("Invalid bounds: start {start} is after end {end} (stream has {len} samples)")]
    InvalidBounds { start: usize, end: usize, len: usize },

    /// A present channel does not share the time channel's length
    #[error("Channel '{channel}' has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Zone boundaries are empty, inverted, overlapping or not contiguous
    #[error("Invalid {kind} zones: {message}")]
    InvalidZones { kind: &'static str, message: String },

    /// Model constants are not usable
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// JSON request could not be decoded (or the result encoded)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::InvalidRequest {
            message: err.to_string(),
        }
    }
}

/// Result type alias for activity analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::InvalidBounds {
            start: 40,
            end: 10,
            len: 100,
        };
        let message = err.to_string();
        assert!(message.contains("start 40"));
        assert!(message.contains("100 samples"));
    }

    #[test]
    fn test_from_json_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: AnalysisError = parse.unwrap_err().into();
        assert!(matches!(err, AnalysisError::InvalidRequest { .. }));
    }
}
