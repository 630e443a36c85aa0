//! Parameters for defect segmentation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, SegmentResult};

/// Parameters for patch-based defect segmentation.
///
/// Points are grouped into patches: `patch_width` units of arc length along
/// the centerline times one of `patch_height` angular bands around it. Each
/// patch gets its own distance threshold.
///
/// # Example
///
/// ```
/// use mesh_defect::SegmentParams;
///
/// let params = SegmentParams::default()
///     .with_patch_width(10.0)
///     .with_bin_width(1.0);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.patch_height, 100);
///
/// let bad = SegmentParams::default().with_patch_height(0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentParams {
    /// Arc length covered by one patch along the centerline.
    pub patch_width: f64,

    /// Number of angular bands around the centerline.
    pub patch_height: usize,

    /// Histogram bin width, also added to every threshold as slack.
    pub bin_width: f64,

    /// Number of robust standard deviations above the median that still
    /// count as normal.
    pub sigma_factor: f64,

    /// Patches with fewer points borrow statistics from their ring.
    pub min_patch_points: usize,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            patch_width: 25.0,
            patch_height: 100,
            bin_width: 5.0,
            sigma_factor: 3.0,
            min_patch_points: 10,
        }
    }
}

impl SegmentParams {
    /// Set the patch width.
    #[must_use]
    pub const fn with_patch_width(mut self, width: f64) -> Self {
        self.patch_width = width;
        self
    }

    /// Set the number of angular bands.
    #[must_use]
    pub const fn with_patch_height(mut self, bands: usize) -> Self {
        self.patch_height = bands;
        self
    }

    /// Set the histogram bin width.
    #[must_use]
    pub const fn with_bin_width(mut self, width: f64) -> Self {
        self.bin_width = width;
        self
    }

    /// Set the sigma factor.
    #[must_use]
    pub const fn with_sigma_factor(mut self, factor: f64) -> Self {
        self.sigma_factor = factor;
        self
    }

    /// Set the minimum number of points for a patch to use its own statistics.
    #[must_use]
    pub const fn with_min_patch_points(mut self, points: usize) -> Self {
        self.min_patch_points = points;
        self
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::InvalidParams`] naming the first bad field.
    pub fn validate(&self) -> SegmentResult<()> {
        if !(self.patch_width.is_finite() && self.patch_width > 0.0) {
            return Err(SegmentError::invalid_params(format!(
                "patch_width must be positive, got {}",
                self.patch_width
            )));
        }
        if self.patch_height == 0 {
            return Err(SegmentError::invalid_params("patch_height must be at least 1"));
        }
        if !(self.bin_width.is_finite() && self.bin_width > 0.0) {
            return Err(SegmentError::invalid_params(format!(
                "bin_width must be positive, got {}",
                self.bin_width
            )));
        }
        if !(self.sigma_factor.is_finite() && self.sigma_factor >= 0.0) {
            return Err(SegmentError::invalid_params(format!(
                "sigma_factor must be non-negative, got {}",
                self.sigma_factor
            )));
        }
        Ok(())
    }
}
