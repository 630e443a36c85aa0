//! Robust per-patch distance statistics.

// Bin indices come from finite, bounded ratios.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scale that turns a median absolute deviation into a standard deviation
/// estimate for normally distributed data.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Histograms never grow past this many bins; outliers land in the last.
const MAX_BINS: usize = 1 << 16;

/// Distance statistics of one group of points.
///
/// Only `reference` and `sigma` feed the threshold. The histogram fields
/// are kept for reporting and never change which points are defects.
///
/// # Example
///
/// ```
/// use mesh_defect::PatchStats;
///
/// let stats = PatchStats::from_distances(&[10.0, 10.0, 10.5, 9.5, 15.0], 3.0, 1.0).unwrap();
/// assert!((stats.reference - 10.0).abs() < 1e-12);
/// assert!((stats.sigma - 1.4826 * 0.5).abs() < 1e-12);
/// assert!((stats.threshold - (10.0 + 3.0 * stats.sigma + 1.0)).abs() < 1e-12);
/// assert_eq!(stats.bin_counts, vec![3, 1, 0, 0, 0, 1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatchStats {
    /// Number of distances.
    pub count: usize,
    /// Median distance: the expected surface distance for the group.
    pub reference: f64,
    /// Robust spread, `1.4826 · MAD`.
    pub sigma: f64,
    /// Distances strictly above this are defects.
    pub threshold: f64,
    /// Smallest distance, where the histogram starts.
    pub min: f64,
    /// Center of the most populated histogram bin.
    pub mode_center: f64,
    /// Histogram counts, bin `i` covering `[min + i·w, min + (i+1)·w)`.
    pub bin_counts: Vec<usize>,
}

impl PatchStats {
    /// Compute statistics for a group of distances.
    ///
    /// The threshold is `median + sigma_factor · sigma + bin_width`.
    /// Returns `None` for an empty group or a non-positive bin width.
    #[must_use]
    pub fn from_distances(values: &[f64], sigma_factor: f64, bin_width: f64) -> Option<Self> {
        if values.is_empty() || bin_width.is_nan() || bin_width <= 0.0 {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let reference = median_of_sorted(&sorted);

        let mut deviations: Vec<f64> = sorted.iter().map(|d| (d - reference).abs()).collect();
        deviations.sort_by(f64::total_cmp);
        let sigma = MAD_TO_SIGMA * median_of_sorted(&deviations);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let bin_counts = histogram(&sorted, min, max, bin_width);
        let modal = bin_counts
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map_or(0, |(i, _)| i);

        Some(Self {
            count: values.len(),
            reference,
            sigma,
            threshold: reference + sigma_factor * sigma + bin_width,
            min,
            mode_center: (modal as f64 + 0.5).mul_add(bin_width, min),
            bin_counts,
        })
    }

    /// Whether `distance` lies above the threshold.
    #[must_use]
    pub fn is_defect(&self, distance: f64) -> bool {
        distance > self.threshold
    }

    /// Distance above the reference, never negative.
    #[must_use]
    pub fn residual(&self, distance: f64) -> f64 {
        (distance - self.reference).max(0.0)
    }
}

/// Median of an ascending slice. Returns 0 for an empty slice.
#[must_use]
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => 0.5 * (sorted[n / 2 - 1] + sorted[n / 2]),
    }
}

fn histogram(values: &[f64], min: f64, max: f64, bin_width: f64) -> Vec<usize> {
    let span = ((max - min) / bin_width).floor();
    let bins = if span.is_finite() {
        (span as usize).saturating_add(1).min(MAX_BINS)
    } else {
        1
    };

    let mut counts = vec![0; bins];
    for v in values {
        let bin = ((v - min) / bin_width).floor();
        let bin = if bin.is_finite() && bin > 0.0 { bin as usize } else { 0 };
        counts[bin.min(bins - 1)] += 1;
    }
    counts
}
