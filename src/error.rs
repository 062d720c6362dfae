//! Error types for Synheart Trend

use thiserror::Error;

/// Errors that can occur while reading input or producing chart payloads.
///
/// Aggregation itself never fails; these cover the boundaries around it.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse sample payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid granularity: {0}")]
    InvalidGranularity(String),

    #[error("Sample validation failed: {0}")]
    ValidationFailed(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
