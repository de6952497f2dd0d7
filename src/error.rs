//! Error types for Healthlog Insights
//!
//! Insight generation itself is total and never fails. These errors cover the
//! surfaces around it: decoding input bundles, loading configuration, and the
//! FFI/CLI layers.

use thiserror::Error;

/// Errors that can occur outside the engine core
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
