//! Statistical defect segmentation for tubular surfaces.
//!
//! Given surface points and the centerline of the tube they lie on, this
//! crate finds the points whose distance to the centerline is unusually
//! large for their neighborhood: dents seen from inside, bulges, and
//! deposits seen from outside.
//!
//! # Patches
//!
//! Tube radius varies slowly along a real part, so a single global
//! threshold would miss small defects on wide sections. Points are instead
//! grouped into patches by the arc length and the angle of their projection
//! onto the centerline, and each patch gets a robust threshold:
//!
//! ```text
//! threshold = median + sigma_factor · 1.4826 · MAD + bin_width
//! ```
//!
//! Patches with too few points borrow statistics from their ring (all
//! patches at the same arc position), then from the whole cloud.
//!
//! # Example
//!
//! ```
//! use mesh_defect::{SegmentParams, classify_faces, segment_defects};
//! use mesh_types::{Point3, open_cylinder};
//!
//! let mut tube = open_cylinder(5.0, 60.0, 31, 24);
//! tube.vertices[15 * 24].x = 9.0;
//!
//! let axis: Vec<_> = (0..=60).map(|z| Point3::new(0.0, 0.0, f64::from(z))).collect();
//! let params = SegmentParams::default().with_patch_height(4).with_bin_width(1.0);
//! let result = segment_defects(&tube.vertices, &axis, &params).unwrap();
//!
//! assert_eq!(result.defects, vec![15 * 24]);
//! let status = classify_faces(&tube, &result.defect_flags());
//! assert_eq!(status.len(), tube.faces.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod colormap;
mod error;
mod faces;
mod params;
mod projection;
mod segmenter;
mod stats;

// Re-export main types and functions
pub use colormap::GradientColorMap;
pub use error::{SegmentError, SegmentResult};
pub use faces::{FaceStatus, classify_faces, defect_flags, face_mean_values, faces_with_status};
pub use params::SegmentParams;
pub use segmenter::{
    DefectSegmenter, PatchThreshold, Segmentation, StatsSource, segment_defects,
};
pub use stats::{MAD_TO_SIGMA, PatchStats, median_of_sorted};
