//! Error types for the defect pipeline.

use mesh_defect::SegmentError;
use mesh_io::IoError;
use mesh_types::MeshError;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading the mesh or writing an artifact failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// The input mesh has malformed faces.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The segmenter rejected its inputs.
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// Writing the JSON summary failed.
    #[error("failed to write summary: {0}")]
    Summary(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(details: impl Into<String>) -> Self {
        Self::Config(details.into())
    }
}
