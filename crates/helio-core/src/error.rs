//! Unified error type for the helio pipeline
//!
//! [`HelioError`] covers the structural failures of the pipeline: unreadable
//! inputs, missing attribute columns, mismatched coordinate systems and
//! forecasts whose parameters are undefined. Data-level problems (a power
//! value that is not a number, an installation outside every district) are
//! not errors; the stages that meet them coerce or drop and log instead.
//!
//! # Example
//!
//! ```ignore
//! use helio_core::{HelioError, HelioResult};
//!
//! fn growth_rate(total: f64, target: f64, years: i32) -> HelioResult<f64> {
//!     if total <= 0.0 {
//!         return Err(HelioError::Validation("no installed capacity".into()));
//!     }
//!     Ok((target / total).ln() / years as f64)
//! }
//! ```

use thiserror::Error;

/// Unified error type for all helio operations.
#[derive(Error, Debug)]
pub enum HelioError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Forecast model errors
    #[error("Forecast error: {0}")]
    Forecast(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Geometry and coordinate system errors
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using HelioError.
pub type HelioResult<T> = Result<T, HelioError>;

impl From<anyhow::Error> for HelioError {
    fn from(err: anyhow::Error) -> Self {
        HelioError::Other(err.to_string())
    }
}

impl From<String> for HelioError {
    fn from(s: String) -> Self {
        HelioError::Other(s)
    }
}

impl From<&str> for HelioError {
    fn from(s: &str) -> Self {
        HelioError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for HelioError {
    fn from(err: serde_json::Error) -> Self {
        HelioError::Parse(err.to_string())
    }
}
