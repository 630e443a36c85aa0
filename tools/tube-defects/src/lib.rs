//! Tube defect pipeline.
//!
//! Loads an OFF mesh of a tube, tracks and smooths its centerline, segments
//! the vertices that sit unusually far from it and writes:
//!
//! - `<prefix>-error.off`: the voxel-scaled mesh colored by distance to the
//!   centerline
//! - `<prefix>-defect.off`: the native mesh with defective faces in green
//! - `<prefix>-defect.id`: defective vertex indices
//! - `<prefix>-def-faces.id`: fully defective face indices
//!
//! The same steps are available without touching the filesystem through
//! [`analyze`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod config;
mod error;
mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{
    Analysis, RunSummary, analyze, defect_mesh, error_mesh, residual_mesh, run, summarize,
    write_outputs,
};
