//! Pipeline configuration.

use std::path::{Path, PathBuf};

use mesh_centerline::{SmoothParams, TrackParams};
use mesh_defect::SegmentParams;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Every tunable of a pipeline run.
///
/// Lengths are in native mesh units. The tracker works on the mesh scaled
/// down by `voxel_size`, so [`tracker_params`](Self::tracker_params) returns
/// its radius and step in voxel units.
///
/// # Example
///
/// ```
/// use tube_defects::PipelineConfig;
///
/// let config = PipelineConfig::new("scan.off", 5.0, 1.0).with_voxel_size(2.0);
/// assert!(config.validate().is_ok());
/// assert!((config.tracker_params().acc_radius - 2.5).abs() < 1e-12);
/// assert_eq!(config.output_path("defect.id").to_str(), Some("output-defect.id"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input OFF mesh.
    pub input: PathBuf,

    /// Prefix for the four standard artifacts.
    pub output_prefix: String,

    /// Accumulation radius.
    pub acc_radius: f64,

    /// Tracking step.
    pub track_step: f64,

    /// Treat face normals as pointing inward.
    pub invert_normal: bool,

    /// Histogram bin width and threshold slack.
    pub bin_width: f64,

    /// Patch length along the centerline.
    pub patch_width: f64,

    /// Angular bands around the centerline.
    pub patch_height: usize,

    /// Edge length of one voxel in native units.
    pub voxel_size: f64,

    /// Spacing of B-spline control points along the raw centerline.
    pub control_spacing: f64,

    /// Spacing of the smoothed centerline samples.
    pub sample_spacing: f64,

    /// Value range mapped onto the error colors, clamped at both ends.
    pub error_range: (f64, f64),

    /// Where to write the voxel-scaled mesh colored by residual.
    pub residual_map: Option<PathBuf>,

    /// Where to write the smoothed centerline.
    pub centerline: Option<PathBuf>,

    /// Where to write the raw tracked centerline.
    pub raw_centerline: Option<PathBuf>,

    /// Where to write per-point distances.
    pub distances: Option<PathBuf>,

    /// Where to write the JSON run summary.
    pub summary: Option<PathBuf>,
}

impl PipelineConfig {
    /// A configuration with the required values and defaults elsewhere.
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, acc_radius: f64, track_step: f64) -> Self {
        let segment = SegmentParams::default();
        let smooth = SmoothParams::default();
        Self {
            input: input.into(),
            output_prefix: "output".to_string(),
            acc_radius,
            track_step,
            invert_normal: false,
            bin_width: segment.bin_width,
            patch_width: segment.patch_width,
            patch_height: segment.patch_height,
            voxel_size: 1.0,
            control_spacing: smooth.control_spacing,
            sample_spacing: smooth.sample_spacing,
            error_range: (0.0, 10.0),
            residual_map: None,
            centerline: None,
            raw_centerline: None,
            distances: None,
            summary: None,
        }
    }

    /// Set the output prefix.
    #[must_use]
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Set the voxel size.
    #[must_use]
    pub const fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// Set the normal inversion flag.
    #[must_use]
    pub const fn with_invert_normal(mut self, invert: bool) -> Self {
        self.invert_normal = invert;
        self
    }

    /// Set the patch grid and histogram bin width.
    #[must_use]
    pub const fn with_patches(mut self, width: f64, height: usize, bin_width: f64) -> Self {
        self.patch_width = width;
        self.patch_height = height;
        self.bin_width = bin_width;
        self
    }

    /// Check every value before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] naming the first bad value.
    pub fn validate(&self) -> PipelineResult<()> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(PipelineError::config(format!(
                "voxel_size must be positive, got {}",
                self.voxel_size
            )));
        }
        let (lo, hi) = self.error_range;
        if !lo.is_finite() || !hi.is_finite() || hi <= lo {
            return Err(PipelineError::config(format!(
                "error_range must satisfy min < max, got [{lo}, {hi}]"
            )));
        }
        if self.output_prefix.is_empty() {
            return Err(PipelineError::config("output prefix must not be empty"));
        }
        self.tracker_params()
            .validate()
            .map_err(|e| PipelineError::config(e.to_string()))?;
        self.smooth_params()
            .validate()
            .map_err(|e| PipelineError::config(e.to_string()))?;
        self.segment_params()
            .validate()
            .map_err(|e| PipelineError::config(e.to_string()))?;
        Ok(())
    }

    /// Tracker parameters in voxel units.
    #[must_use]
    pub fn tracker_params(&self) -> TrackParams {
        TrackParams::new(self.acc_radius, self.track_step)
            .with_invert_normal(self.invert_normal)
            .in_voxel_units(self.voxel_size)
    }

    /// Smoothing parameters in native units.
    #[must_use]
    pub fn smooth_params(&self) -> SmoothParams {
        SmoothParams::default()
            .with_control_spacing(self.control_spacing)
            .with_sample_spacing(self.sample_spacing)
    }

    /// Segmentation parameters in native units.
    #[must_use]
    pub fn segment_params(&self) -> SegmentParams {
        SegmentParams::default()
            .with_patch_width(self.patch_width)
            .with_patch_height(self.patch_height)
            .with_bin_width(self.bin_width)
    }

    /// `<prefix>-<suffix>`.
    #[must_use]
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        PathBuf::from(format!("{}-{suffix}", self.output_prefix))
    }

    /// The input mesh path.
    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }
}
