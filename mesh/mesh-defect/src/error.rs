//! Error types for defect segmentation.

use thiserror::Error;

/// Result type alias for segmentation operations.
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Errors that can occur during defect segmentation.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Invalid segmentation parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// A color map needs at least two ordered stops.
    #[error("invalid color map: {0}")]
    InvalidColorMap(String),
}

impl SegmentError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Create an invalid color map error.
    #[must_use]
    pub fn invalid_color_map(details: impl Into<String>) -> Self {
        Self::InvalidColorMap(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SegmentError::invalid_params("bin_width must be positive");
        assert!(format!("{err}").contains("bin_width"));

        let err = SegmentError::invalid_color_map("stops out of order");
        assert!(format!("{err}").contains("out of order"));
    }
}
