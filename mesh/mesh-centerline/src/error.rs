//! Error types for centerline extraction.

use thiserror::Error;

/// Result type alias for centerline operations.
pub type CenterlineResult<T> = Result<T, CenterlineError>;

/// Errors that can occur during centerline extraction.
///
/// The public entry points never return these. They are produced by
/// parameter validation and reported through logs and stop reasons.
#[derive(Debug, Error)]
pub enum CenterlineError {
    /// Invalid tracking or smoothing parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Not enough input points for the requested operation.
    #[error("need at least {required} points, got {actual}")]
    TooFewPoints {
        /// Minimum number of points required.
        required: usize,
        /// Number of points given.
        actual: usize,
    },
}

impl CenterlineError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Create a too-few-points error.
    #[must_use]
    pub const fn too_few_points(required: usize, actual: usize) -> Self {
        Self::TooFewPoints { required, actual }
    }
}
