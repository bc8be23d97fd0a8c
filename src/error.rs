//! Error types for NailGuard

use thiserror::Error;

/// Errors that can occur while processing frames.
///
/// Absent landmarks are not errors: a frame without a hand or a face degrades
/// to `BehaviorLabel::None` and is handled with `Option` sentinels throughout
/// the pipeline.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Failed to parse frame payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Sensitivity {0} outside valid range {1}-{2}")]
    InvalidSensitivity(u32, u32, u32),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Tip source unavailable: {0}")]
    TipSourceUnavailable(String),
}
