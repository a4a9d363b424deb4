//! Estimator Error Types

use thiserror::Error;

/// Errors surfaced at the ingestion boundary
///
/// The algorithm itself has no recoverable failure modes; only invalid
/// caller input is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum AdaptiveMeanError {
    #[error("delta must lie strictly between 0 and 1, got {0}")]
    InvalidDelta(f64),

    #[error("samples must be finite, got {0}")]
    NonFiniteSample(f64),
}

/// Result type for estimator operations
pub type Result<T> = std::result::Result<T, AdaptiveMeanError>;
