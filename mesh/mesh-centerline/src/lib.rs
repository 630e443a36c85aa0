//! Centerline extraction for tubular meshes.
//!
//! This crate turns the surface of a tube (a scanned pipe, duct or log) into
//! a 1-D curve running through its interior.
//!
//! # Algorithm
//!
//! Tracking is accumulation based. Every face casts a line along its inward
//! normal; on a tube these lines meet at the axis, and the normals themselves
//! are all perpendicular to it. Starting at one end of the tube,
//! [`track_centerline`] repeatedly steps forward, gathers the faces in a slab
//! around the new position, and uses their normals to correct both the
//! direction and the position.
//!
//! The raw track is then fitted with a clamped B-spline and resampled at a
//! fixed spacing by [`smooth_centerline`].
//!
//! # Example
//!
//! ```
//! use cf_spatial::GridBounds;
//! use mesh_centerline::{SmoothParams, TrackParams, smooth_centerline, track_centerline};
//! use mesh_types::{MeshBounds, open_cylinder};
//!
//! let tube = open_cylinder(10.0, 80.0, 41, 36);
//! let track = track_centerline(&tube, &TrackParams::new(5.0, 1.0));
//!
//! let bounds = tube.bounds();
//! let domain = GridBounds::enclosing(&bounds.min, &bounds.max).unwrap();
//! let centerline = smooth_centerline(&track.points, &domain, &SmoothParams::default());
//!
//! assert!(centerline.len() > 70);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod params;
mod smooth;
mod surface;
mod tracker;

// Re-export main types and functions
pub use error::{CenterlineError, CenterlineResult};
pub use params::{SmoothParams, TrackParams};
pub use smooth::smooth_centerline;
pub use tracker::{StopReason, TrackResult, track_centerline};
