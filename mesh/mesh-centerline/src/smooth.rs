//! B-spline smoothing of a raw centerline.

// Sample counts come from arc lengths; casts are safe for practical sizes.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use cf_spatial::GridBounds;
use curve_types::{BSpline, Curve, Polyline};
use mesh_types::Point3;
use tracing::{debug, warn};

use crate::error::{CenterlineError, CenterlineResult};
use crate::params::SmoothParams;

/// Spline samples per control span before resampling by arc length.
const SAMPLES_PER_SPAN: usize = 8;

/// Smooth a raw centerline into an evenly sampled curve inside `domain`.
///
/// The raw points are resampled to control points every
/// `control_spacing`, a clamped B-spline is fitted through them, and the
/// spline is resampled every `sample_spacing`. Every output point is clamped
/// into `domain`. The first and last output points are the first and last
/// raw points, so travel order is preserved.
///
/// Input that cannot carry a spline (fewer than `degree + 1` points, zero
/// length, non-finite coordinates, invalid parameters) is returned as is,
/// clamped into `domain`.
///
/// # Example
///
/// ```
/// use cf_spatial::{GridBounds, VoxelCoord};
/// use mesh_centerline::{SmoothParams, smooth_centerline};
/// use mesh_types::Point3;
///
/// let raw: Vec<_> = (0..=20).map(|i| Point3::new(0.0, 0.0, f64::from(i))).collect();
/// let domain = GridBounds::new(VoxelCoord::new(-5, -5, 0), VoxelCoord::new(5, 5, 20));
///
/// let smooth = smooth_centerline(&raw, &domain, &SmoothParams::default());
/// assert_eq!(smooth.len(), 21);
/// assert!((smooth[20].z - 20.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn smooth_centerline(
    raw: &[Point3<f64>],
    domain: &GridBounds,
    params: &SmoothParams,
) -> Vec<Point3<f64>> {
    match fit(raw, params) {
        Ok(samples) => {
            debug!(
                raw_points = raw.len(),
                samples = samples.len(),
                "Smoothed centerline"
            );
            samples.iter().map(|p| domain.clamp_point(p)).collect()
        }
        Err(err) => {
            warn!(%err, points = raw.len(), "Centerline left unsmoothed");
            raw.iter().map(|p| domain.clamp_point(p)).collect()
        }
    }
}

fn fit(raw: &[Point3<f64>], params: &SmoothParams) -> CenterlineResult<Vec<Point3<f64>>> {
    params.validate()?;
    if raw.len() < params.min_points() {
        return Err(CenterlineError::too_few_points(params.min_points(), raw.len()));
    }

    let polyline = Polyline::try_new(raw.to_vec())
        .map_err(|e| CenterlineError::invalid_params(e.to_string()))?;
    let length = polyline.arc_length();
    if length <= f64::EPSILON {
        return Err(CenterlineError::invalid_params("raw centerline has zero length"));
    }

    let controls = ((length / params.control_spacing).round() as usize + 1)
        .clamp(params.min_points(), raw.len());
    let control = polyline.resampled(controls);

    let spline = BSpline::clamped(control.into_vertices(), params.degree)
        .map_err(|e| CenterlineError::invalid_params(e.to_string()))?;
    let spans = controls - params.degree;
    let dense = Polyline::try_new(spline.sample_uniform(spans * SAMPLES_PER_SPAN + 1))
        .map_err(|e| CenterlineError::invalid_params(e.to_string()))?;

    Ok(dense.resampled_by_spacing(params.sample_spacing).into_vertices())
}
