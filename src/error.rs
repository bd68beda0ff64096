//! Error types
//!
//! Only startup can fail. Runtime races (e.g. an inspection resolving after its
//! package was evicted) are logged and ignored, never surfaced.

use thiserror::Error;

/// Rejected configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("lane sizing is required (inspection line and package width)")]
    MissingSizing,
    #[error("lane sizing must be finite with positive widths (lane {lane_width}, package {item_width})")]
    InvalidSizing { lane_width: f32, item_width: f32 },
    #[error("malicious probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("burst size range must satisfy 1 <= min <= max, got [{min}, {max}]")]
    InvalidBurstSize { min: u32, max: u32 },
    #[error("{name} must satisfy 0 <= min < max, got [{min}, {max})")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure reported by a frame source
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("display refresh signal unavailable: {0}")]
    Unavailable(String),
}

/// Session startup failure. No partial start happens on any of these.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no refresh-signal source: {0}")]
    NoRefreshSource(String),
}

impl From<SchedulerError> for StartError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::Unavailable(reason) => StartError::NoRefreshSource(reason),
        }
    }
}
