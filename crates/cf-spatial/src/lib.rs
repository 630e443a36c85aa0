//! Spatial hashing and integer domains for tube inspection.
//!
//! This crate provides the small spatial layer shared by the centerline
//! tracker, the smoother and the defect segmenter:
//!
//! - [`VoxelCoord`] - Integer cell coordinates
//! - [`GridBounds`] - Inclusive integer box; doubles as the clamping domain
//!   for smoothed centerlines
//! - [`VoxelGrid`] - Sparse hash grid used for neighborhood lookups and
//!   visited-cell bookkeeping
//!
//! # Coordinate Systems
//!
//! World coordinates are continuous `f64` values. Grid coordinates are
//! discrete `i32` values. The [`VoxelGrid`] converts between the two by
//! flooring, so every world point maps to exactly one cell.
//!
//! # Example
//!
//! ```
//! use cf_spatial::{VoxelGrid, VoxelCoord};
//! use nalgebra::Point3;
//!
//! let mut grid: VoxelGrid<Vec<u32>> = VoxelGrid::new(2.0);
//! grid.get_or_insert_default(VoxelCoord::new(0, 0, 0)).push(7);
//!
//! let near: Vec<u32> = grid
//!     .query_radius(Point3::new(1.0, 1.0, 1.0), 1.5)
//!     .flat_map(|(_, ids)| ids.iter().copied())
//!     .collect();
//! assert_eq!(near, vec![7]);
//! ```
//!
//! # Domains
//!
//! ```
//! use cf_spatial::GridBounds;
//! use nalgebra::Point3;
//!
//! let domain = GridBounds::enclosing(
//!     &Point3::new(-0.5, 0.0, 0.0),
//!     &Point3::new(10.2, 4.0, 3.9),
//! ).unwrap();
//! let clamped = domain.clamp_point(&Point3::new(20.0, -3.0, 1.0));
//! assert_eq!(clamped, Point3::new(11.0, 0.0, 1.0));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod grid;
mod voxel;

// Re-export core types
pub use error::SpatialError;
pub use grid::{GridBounds, VoxelGrid};
pub use voxel::VoxelCoord;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
