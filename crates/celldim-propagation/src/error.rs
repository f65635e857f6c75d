//! Error types for path loss evaluation.

use thiserror::Error;

/// Result type for path loss operations.
pub type PropagationResult<T> = Result<T, PropagationError>;

/// Domain errors raised before a logarithmic formula is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    /// Parameter must be strictly positive.
    #[error("{parameter} must be strictly positive, got {value}")]
    NonPositive {
        /// Parameter name.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Parameter is NaN or infinite.
    #[error("{parameter} must be a finite number")]
    NonFinite {
        /// Parameter name.
        parameter: &'static str,
    },
}

/// Reject values a logarithm cannot take.
pub(crate) fn ensure_positive(parameter: &'static str, value: f64) -> PropagationResult<f64> {
    if !value.is_finite() {
        return Err(PropagationError::NonFinite { parameter });
    }
    if value <= 0.0 {
        return Err(PropagationError::NonPositive { parameter, value });
    }
    Ok(value)
}
