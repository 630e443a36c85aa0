//! Parameters for centerline tracking and smoothing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CenterlineError, CenterlineResult};

/// Parameters for accumulation-based centerline tracking.
///
/// Lengths are in the units of the mesh handed to the tracker, which is
/// usually the voxel-scaled mesh.
///
/// # Example
///
/// ```
/// use mesh_centerline::TrackParams;
///
/// let params = TrackParams::new(5.0, 1.0).with_invert_normal(true);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.max_steps, 50_000);
///
/// let bad = TrackParams::new(0.0, 1.0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackParams {
    /// Accumulation radius: half-height of the slab of faces that vote
    /// for the center at each step.
    pub acc_radius: f64,

    /// Distance advanced along the current direction per step.
    pub track_step: f64,

    /// Treat face normals as pointing inward instead of outward.
    pub invert_normal: bool,

    /// Upper bound on tracking steps.
    pub max_steps: usize,

    /// Minimum number of supporting faces for a step to be accepted.
    pub min_support: usize,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            acc_radius: 5.0,
            track_step: 1.0,
            invert_normal: false,
            max_steps: 50_000,
            min_support: 3,
        }
    }
}

impl TrackParams {
    /// Create params with the given radius and step, other fields default.
    #[must_use]
    pub const fn new(acc_radius: f64, track_step: f64) -> Self {
        Self {
            acc_radius,
            track_step,
            invert_normal: false,
            max_steps: 50_000,
            min_support: 3,
        }
    }

    /// Set the accumulation radius.
    #[must_use]
    pub const fn with_acc_radius(mut self, radius: f64) -> Self {
        self.acc_radius = radius;
        self
    }

    /// Set the tracking step.
    #[must_use]
    pub const fn with_track_step(mut self, step: f64) -> Self {
        self.track_step = step;
        self
    }

    /// Set whether normals are inverted.
    #[must_use]
    pub const fn with_invert_normal(mut self, invert: bool) -> Self {
        self.invert_normal = invert;
        self
    }

    /// Set the step limit.
    #[must_use]
    pub const fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    /// Set the minimum face support.
    #[must_use]
    pub const fn with_min_support(mut self, faces: usize) -> Self {
        self.min_support = faces;
        self
    }

    /// Return a copy with both lengths divided by `voxel_size`.
    ///
    /// A non-positive voxel size leaves the lengths unchanged.
    #[must_use]
    pub fn in_voxel_units(&self, voxel_size: f64) -> Self {
        let mut scaled = self.clone();
        if voxel_size > 0.0 {
            scaled.acc_radius /= voxel_size;
            scaled.track_step /= voxel_size;
        }
        scaled
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::InvalidParams`] naming the first bad field.
    pub fn validate(&self) -> CenterlineResult<()> {
        if !(self.acc_radius.is_finite() && self.acc_radius > 0.0) {
            return Err(CenterlineError::invalid_params(format!(
                "acc_radius must be positive, got {}",
                self.acc_radius
            )));
        }
        if !(self.track_step.is_finite() && self.track_step > 0.0) {
            return Err(CenterlineError::invalid_params(format!(
                "track_step must be positive, got {}",
                self.track_step
            )));
        }
        if self.max_steps == 0 {
            return Err(CenterlineError::invalid_params("max_steps must be at least 1"));
        }
        if self.min_support == 0 {
            return Err(CenterlineError::invalid_params("min_support must be at least 1"));
        }
        Ok(())
    }
}

/// Parameters for B-spline smoothing of a raw centerline.
///
/// # Example
///
/// ```
/// use mesh_centerline::SmoothParams;
///
/// let params = SmoothParams::default().with_sample_spacing(0.5);
/// assert_eq!(params.degree, 3);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmoothParams {
    /// Arc length between control points of the fitted spline.
    pub control_spacing: f64,

    /// Arc length between output samples.
    pub sample_spacing: f64,

    /// Spline degree.
    pub degree: usize,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            control_spacing: 5.0,
            sample_spacing: 1.0,
            degree: 3, // cubic
        }
    }
}

impl SmoothParams {
    /// Set the control point spacing.
    #[must_use]
    pub const fn with_control_spacing(mut self, spacing: f64) -> Self {
        self.control_spacing = spacing;
        self
    }

    /// Set the output sample spacing.
    #[must_use]
    pub const fn with_sample_spacing(mut self, spacing: f64) -> Self {
        self.sample_spacing = spacing;
        self
    }

    /// Set the spline degree.
    #[must_use]
    pub const fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    /// Number of raw points needed before a spline is fitted.
    #[must_use]
    pub const fn min_points(&self) -> usize {
        self.degree + 1
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::InvalidParams`] naming the first bad field.
    pub fn validate(&self) -> CenterlineResult<()> {
        if !(self.control_spacing.is_finite() && self.control_spacing > 0.0) {
            return Err(CenterlineError::invalid_params(format!(
                "control_spacing must be positive, got {}",
                self.control_spacing
            )));
        }
        if !(self.sample_spacing.is_finite() && self.sample_spacing > 0.0) {
            return Err(CenterlineError::invalid_params(format!(
                "sample_spacing must be positive, got {}",
                self.sample_spacing
            )));
        }
        if self.degree == 0 {
            return Err(CenterlineError::invalid_params("degree must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_track_params() {
        let params = TrackParams::default();
        assert!((params.acc_radius - 5.0).abs() < f64::EPSILON);
        assert!((params.track_step - 1.0).abs() < f64::EPSILON);
        assert!(!params.invert_normal);
        assert_eq!(params.min_support, 3);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_track_builder_pattern() {
        let params = TrackParams::default()
            .with_acc_radius(8.0)
            .with_track_step(2.0)
            .with_max_steps(10)
            .with_min_support(5);

        assert!((params.acc_radius - 8.0).abs() < f64::EPSILON);
        assert!((params.track_step - 2.0).abs() < f64::EPSILON);
        assert_eq!(params.max_steps, 10);
        assert_eq!(params.min_support, 5);
    }

    #[test]
    fn test_track_validation() {
        assert!(TrackParams::new(-1.0, 1.0).validate().is_err());
        assert!(TrackParams::new(5.0, 0.0).validate().is_err());
        assert!(TrackParams::new(f64::NAN, 1.0).validate().is_err());
        assert!(TrackParams::new(5.0, 1.0).with_max_steps(0).validate().is_err());
        assert!(TrackParams::new(5.0, 1.0).with_min_support(0).validate().is_err());
    }

    #[test]
    fn test_voxel_units() {
        let params = TrackParams::new(5.0, 1.0).in_voxel_units(0.5);
        assert!((params.acc_radius - 10.0).abs() < f64::EPSILON);
        assert!((params.track_step - 2.0).abs() < f64::EPSILON);

        let unchanged = TrackParams::new(5.0, 1.0).in_voxel_units(0.0);
        assert!((unchanged.acc_radius - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_smooth_validation() {
        let params = SmoothParams::default();
        assert_eq!(params.min_points(), 4);
        assert!(params.validate().is_ok());
        assert!(params.clone().with_degree(0).validate().is_err());
        assert!(params.clone().with_control_spacing(0.0).validate().is_err());
        assert!(params.with_sample_spacing(f64::INFINITY).validate().is_err());
    }
}
