//! Error types for spatial operations.

/// Errors that can occur during spatial operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SpatialError {
    /// A world coordinate could not be represented as a grid coordinate.
    #[error("world coordinate {value} cannot be mapped to an integer cell")]
    CoordinateOutOfRange {
        /// The offending coordinate value.
        value: f64,
    },
}
