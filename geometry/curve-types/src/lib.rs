//! Parametric curve types for centerline modeling.
//!
//! This crate provides the curve primitives used to represent and smooth a
//! tube centerline:
//!
//! - [`Polyline`] - Piecewise linear curves with exact closest-point projection
//! - [`BSpline`] - B-spline curves with arbitrary degree
//! - [`Frame`] - Rotation-minimizing frames for measuring angles around a curve
//!
//! # Core Traits
//!
//! All curve types implement the [`Curve`] trait, which provides:
//!
//! - **Evaluation**: Position and tangent at parameter `t ∈ [0, 1]`
//! - **Arc length**: Total length and arc-length parameterization
//! - **Sampling**: Uniform in parameter or in arc length
//!
//! # Example
//!
//! ```
//! use curve_types::{BSpline, Curve, Polyline};
//! use nalgebra::Point3;
//!
//! let raw = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.3, 0.0),
//!     Point3::new(2.0, -0.2, 0.0),
//!     Point3::new(3.0, 0.1, 0.0),
//!     Point3::new(4.0, 0.0, 0.0),
//! ];
//! let spline = BSpline::clamped(raw, 3).unwrap();
//! let dense = Polyline::try_new(spline.sample_uniform(64)).unwrap();
//! let even = dense.resampled(9);
//! assert_eq!(even.len(), 9);
//! ```
//!
//! # Coordinate System
//!
//! Right-handed, consistent with `mesh-types`.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for all types

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::suboptimal_flops,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::needless_range_loop,
    clippy::return_self_not_must_use
)]

mod bspline;
mod error;
mod frame;
mod polyline;
mod traits;

// Re-export core types
pub use bspline::BSpline;
pub use error::CurveError;
pub use frame::{Frame, polyline_segment_frames};
pub use polyline::{Polyline, PolylineProjection};
pub use traits::Curve;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;
