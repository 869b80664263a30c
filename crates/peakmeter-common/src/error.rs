//! Error types for Peakmeter
//!
//! The metering algorithms themselves never fail. Errors only surface from
//! the edges: index conversion, clock conversion, and configuration loading.

use thiserror::Error;

/// Result type alias using MeterError
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type for Peakmeter operations
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("Invalid horizon index: {index} (expected 0..{count})")]
    InvalidHorizon { index: usize, count: usize },

    #[error("Clock error: {0}")]
    Clock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MeterError {
    fn from(err: serde_json::Error) -> Self {
        MeterError::Serialization(err.to_string())
    }
}
