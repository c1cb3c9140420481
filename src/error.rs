//! Error types.
//!
//! The layout core is total and never returns these; they cover value
//! construction, option loading and playback scheduling.

use thiserror::Error;

/// Invalid model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Durations need a positive numerator and denominator
    #[error("Invalid duration {num}/{den}: numerator and denominator must be positive")]
    InvalidDuration { num: u32, den: u32 },
}

/// Failures while loading layout options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid layout options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while scheduling playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Nothing to schedule
    #[error("Cannot schedule playback for an empty event sequence")]
    EmptyInput,
}
