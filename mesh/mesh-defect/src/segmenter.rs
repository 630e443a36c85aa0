//! Patch-based statistical defect segmentation.
//!
//! Every point is projected onto the centerline. Its distance to the
//! projection is the local tube radius, and the projection's arc length and
//! angle place it in a patch. Within a patch the radius should be roughly
//! constant, so points far above the patch's typical radius are defects.

// Patch ids and bin counts come from finite, bounded ratios.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::f64::consts::TAU;

use curve_types::{Curve, Frame, PolylineProjection, polyline_segment_frames};
use hashbrown::HashMap;
use mesh_types::Point3;
use rayon::prelude::*;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SegmentResult;
use crate::params::SegmentParams;
use crate::projection::CenterlineIndex;
use crate::stats::PatchStats;

/// Which group of points a patch's threshold was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StatsSource {
    /// The patch itself.
    Patch,
    /// Every patch at the same arc position.
    Ring,
    /// The whole point cloud.
    Global,
}

/// Threshold applied to the points of one patch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatchThreshold {
    /// Where the statistics came from.
    pub source: StatsSource,
    /// Expected distance; residuals are measured from here.
    pub reference: f64,
    /// Distances strictly above this are defects.
    pub threshold: f64,
}

/// Everything computed by a segmentation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// Distance from each point to the centerline.
    pub distances: Vec<f64>,
    /// Arc length of each point's projection.
    pub arcs: Vec<f64>,
    /// Patch id of each point.
    pub patches: Vec<usize>,
    /// Distance above the patch reference, per point.
    pub residuals: Vec<f64>,
    /// Defective point indices, ascending.
    pub defects: Vec<usize>,
    /// Number of patch ids in the grid (occupied or not).
    pub patch_count: usize,
    /// Number of arc bins along the centerline.
    pub arc_bins: usize,
    /// Number of angular bands per arc bin.
    pub bands: usize,
    /// Length of the centerline.
    pub centerline_length: f64,
    /// Own statistics of every occupied patch.
    pub patch_stats: HashMap<usize, PatchStats>,
    /// Threshold used for every occupied patch.
    pub thresholds: HashMap<usize, PatchThreshold>,
}

impl Segmentation {
    /// Whether point `index` was flagged.
    #[must_use]
    pub fn is_defect(&self, index: usize) -> bool {
        self.defects.binary_search(&index).is_ok()
    }

    /// One flag per point, `true` for defects.
    #[must_use]
    pub fn defect_flags(&self) -> Vec<bool> {
        crate::faces::defect_flags(self.distances.len(), &self.defects)
    }

    /// Number of patches that fell back to ring or global statistics.
    #[must_use]
    pub fn fallback_count(&self, source: StatsSource) -> usize {
        self.thresholds.values().filter(|t| t.source == source).count()
    }
}

/// Patch-based defect segmenter over a borrowed point cloud and centerline.
///
/// Construct with [`DefectSegmenter::new`], run [`DefectSegmenter::init`],
/// then read results through the getters. Getters return empty slices until
/// `init` has run. `init` recomputes everything from the inputs, so calling
/// it again gives the same results.
///
/// # Example
///
/// ```
/// use mesh_defect::{DefectSegmenter, SegmentParams};
/// use mesh_types::Point3;
///
/// let centerline = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 10.0)];
/// let mut points: Vec<_> = (0..40)
///     .map(|i| {
///         let a = f64::from(i) * 0.5;
///         Point3::new(2.0 * a.cos(), 2.0 * a.sin(), f64::from(i) * 0.25)
///     })
///     .collect();
/// points[7].x *= 3.0;
///
/// let params = SegmentParams::default().with_bin_width(0.5);
/// let mut segmenter = DefectSegmenter::new(&points, &centerline, params).unwrap();
/// assert!(segmenter.distances().is_empty());
///
/// segmenter.init();
/// assert_eq!(segmenter.patch_count(), 1);
/// assert_eq!(segmenter.defects(), &[7]);
/// ```
#[derive(Debug, Clone)]
pub struct DefectSegmenter<'a> {
    points: &'a [Point3<f64>],
    centerline: &'a [Point3<f64>],
    params: SegmentParams,
    state: Segmentation,
}

impl<'a> DefectSegmenter<'a> {
    /// Create a segmenter. Nothing is computed until [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::InvalidParams`](crate::SegmentError::InvalidParams)
    /// if the parameters fail validation.
    pub fn new(
        points: &'a [Point3<f64>],
        centerline: &'a [Point3<f64>],
        params: SegmentParams,
    ) -> SegmentResult<Self> {
        params.validate()?;
        Ok(Self {
            points,
            centerline,
            params,
            state: Segmentation::default(),
        })
    }

    /// Compute distances, patches, thresholds and defects.
    pub fn init(&mut self) {
        self.state = compute(self.points, self.centerline, &self.params);
    }

    /// The parameters in use.
    #[must_use]
    pub const fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Distance from each point to the centerline.
    #[must_use]
    pub fn distances(&self) -> &[f64] {
        &self.state.distances
    }

    /// Defective point indices, ascending.
    #[must_use]
    pub fn defects(&self) -> &[usize] {
        &self.state.defects
    }

    /// Patch id of point `index`.
    #[must_use]
    pub fn patch_of(&self, index: usize) -> Option<usize> {
        self.state.patches.get(index).copied()
    }

    /// Patch id of every point.
    #[must_use]
    pub fn patches(&self) -> &[usize] {
        &self.state.patches
    }

    /// Distance above the patch reference, per point.
    #[must_use]
    pub fn residuals(&self) -> &[f64] {
        &self.state.residuals
    }

    /// Number of patch ids in the grid.
    #[must_use]
    pub const fn patch_count(&self) -> usize {
        self.state.patch_count
    }

    /// Own statistics of an occupied patch.
    #[must_use]
    pub fn patch_stats(&self, patch: usize) -> Option<&PatchStats> {
        self.state.patch_stats.get(&patch)
    }

    /// Full results of the last [`init`](Self::init).
    #[must_use]
    pub const fn segmentation(&self) -> &Segmentation {
        &self.state
    }

    /// Consume the segmenter, keeping its results.
    #[must_use]
    pub fn into_segmentation(self) -> Segmentation {
        self.state
    }
}

/// Run a full segmentation in one call.
///
/// # Errors
///
/// Returns [`SegmentError::InvalidParams`](crate::SegmentError::InvalidParams)
/// if the parameters fail validation.
///
/// # Example
///
/// ```
/// use mesh_defect::{SegmentParams, segment_defects};
///
/// let result = segment_defects(&[], &[], &SegmentParams::default()).unwrap();
/// assert!(result.defects.is_empty());
/// assert_eq!(result.patch_count, 0);
/// ```
pub fn segment_defects(
    points: &[Point3<f64>],
    centerline: &[Point3<f64>],
    params: &SegmentParams,
) -> SegmentResult<Segmentation> {
    let mut segmenter = DefectSegmenter::new(points, centerline, params.clone())?;
    segmenter.init();
    Ok(segmenter.into_segmentation())
}

/// Upper bound on arc bins along one centerline.
const MAX_ARC_BINS: usize = 1 << 20;

/// Arc-by-angle patch layout around a centerline.
///
/// `arc_bins * bands` never overflows.
struct PatchGrid {
    frames: Vec<Frame>,
    arc_bins: usize,
    bands: usize,
    width: f64,
}

impl PatchGrid {
    fn new(index: &CenterlineIndex, params: &SegmentParams) -> (Self, f64) {
        let Some(polyline) = index.polyline() else {
            return (Self::single(params), 0.0);
        };
        let length = polyline.arc_length();
        if length < params.patch_width {
            return (Self::single(params), length);
        }
        let mut arc_bins = ((length / params.patch_width).ceil() as usize).max(1);
        let mut width = params.patch_width;
        if arc_bins > MAX_ARC_BINS {
            warn!(
                requested = arc_bins,
                max = MAX_ARC_BINS,
                "Patch width too small for the centerline, widening arc bins"
            );
            arc_bins = MAX_ARC_BINS;
            width = length / MAX_ARC_BINS as f64;
        }
        if arc_bins.checked_mul(params.patch_height).is_none() {
            warn!(
                arc_bins,
                bands = params.patch_height,
                "Patch grid overflows, using a single patch"
            );
            return (Self::single(params), length);
        }
        let grid = Self {
            frames: polyline_segment_frames(polyline),
            arc_bins,
            bands: params.patch_height,
            width,
        };
        (grid, length)
    }

    fn single(params: &SegmentParams) -> Self {
        Self {
            frames: Vec::new(),
            arc_bins: 1,
            bands: 1,
            width: params.patch_width,
        }
    }

    fn is_single(&self) -> bool {
        self.frames.is_empty()
    }

    const fn patch_count(&self) -> usize {
        self.arc_bins * self.bands
    }

    fn patch_of(&self, point: &Point3<f64>, projection: &PolylineProjection) -> usize {
        if self.is_single() {
            return 0;
        }
        let arc_bin = ((projection.arc / self.width).floor().max(0.0) as usize).min(self.arc_bins - 1);
        let frame = &self.frames[projection.segment.min(self.frames.len() - 1)];
        let angle = frame.angle_around(&(point - projection.point));
        let band = ((angle / TAU * self.bands as f64).floor() as usize).min(self.bands - 1);
        arc_bin * self.bands + band
    }
}

fn compute(points: &[Point3<f64>], centerline: &[Point3<f64>], params: &SegmentParams) -> Segmentation {
    if points.is_empty() {
        return Segmentation::default();
    }
    let Some(index) = CenterlineIndex::build(centerline) else {
        warn!(
            centerline_points = centerline.len(),
            "No usable centerline, skipping defect segmentation"
        );
        return Segmentation::default();
    };

    info!(
        points = points.len(),
        centerline_points = centerline.len(),
        patch_width = params.patch_width,
        patch_height = params.patch_height,
        bin_width = params.bin_width,
        "Segmenting defects"
    );

    let projections = index.project_all(points);
    let (grid, centerline_length) = PatchGrid::new(&index, params);
    let patches: Vec<usize> = points
        .par_iter()
        .zip(projections.par_iter())
        .map(|(p, proj)| grid.patch_of(p, proj))
        .collect();
    let distances: Vec<f64> = projections.iter().map(|p| p.distance).collect();

    let patch_stats = group_stats(&patches, &distances, params);
    let thresholds = choose_thresholds(&patch_stats, &patches, &distances, grid.bands, params);

    let verdicts: Vec<(bool, f64)> = patches
        .par_iter()
        .zip(distances.par_iter())
        .map(|(patch, &d)| {
            thresholds.get(patch).map_or((false, 0.0), |t| {
                (d > t.threshold, (d - t.reference).max(0.0))
            })
        })
        .collect();

    let defects: Vec<usize> = verdicts
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.0.then_some(i))
        .collect();
    let residuals = verdicts.into_iter().map(|v| v.1).collect();

    let segmentation = Segmentation {
        distances,
        arcs: projections.iter().map(|p| p.arc).collect(),
        patches,
        residuals,
        defects,
        patch_count: grid.patch_count(),
        arc_bins: grid.arc_bins,
        bands: grid.bands,
        centerline_length,
        patch_stats,
        thresholds,
    };

    debug!(
        occupied_patches = segmentation.patch_stats.len(),
        ring_fallbacks = segmentation.fallback_count(StatsSource::Ring),
        global_fallbacks = segmentation.fallback_count(StatsSource::Global),
        "Patch thresholds chosen"
    );
    info!(
        defects = segmentation.defects.len(),
        patches = segmentation.patch_count,
        "Defect segmentation complete"
    );
    segmentation
}

/// Statistics of every group in `labels`, computed in parallel.
fn group_stats(
    labels: &[usize],
    distances: &[f64],
    params: &SegmentParams,
) -> HashMap<usize, PatchStats> {
    let mut members: HashMap<usize, Vec<f64>> = HashMap::new();
    for (&label, &d) in labels.iter().zip(distances) {
        members.entry(label).or_default().push(d);
    }
    let groups: Vec<(usize, Vec<f64>)> = members.into_iter().collect();

    groups
        .into_par_iter()
        .filter_map(|(label, values)| {
            PatchStats::from_distances(&values, params.sigma_factor, params.bin_width)
                .map(|stats| (label, stats))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Pick each occupied patch's threshold: its own statistics when it has
/// enough points, else its ring's, else the whole cloud's.
fn choose_thresholds(
    patch_stats: &HashMap<usize, PatchStats>,
    patches: &[usize],
    distances: &[f64],
    bands: usize,
    params: &SegmentParams,
) -> HashMap<usize, PatchThreshold> {
    let enough = |stats: &PatchStats| stats.count >= params.min_patch_points;

    let needs_fallback = patch_stats.values().any(|s| !enough(s));
    let (ring_stats, global) = if needs_fallback {
        let rings: Vec<usize> = patches.iter().map(|p| p / bands).collect();
        (
            group_stats(&rings, distances, params),
            PatchStats::from_distances(distances, params.sigma_factor, params.bin_width),
        )
    } else {
        (HashMap::new(), None)
    };

    patch_stats
        .iter()
        .map(|(&patch, own)| {
            let (source, stats) = if enough(own) {
                (StatsSource::Patch, own)
            } else {
                match ring_stats.get(&(patch / bands)) {
                    Some(ring) if enough(ring) => (StatsSource::Ring, ring),
                    _ => global
                        .as_ref()
                        .map_or((StatsSource::Patch, own), |g| (StatsSource::Global, g)),
                }
            };
            (
                patch,
                PatchThreshold {
                    source,
                    reference: stats.reference,
                    threshold: stats.threshold,
                },
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Points on a radius-`r` tube around the z axis from z=0 to z=`length`.
    fn tube_points(r: f64, length: f64, rings: usize, segments: usize) -> Vec<Point3<f64>> {
        let mut points = Vec::with_capacity(rings * segments);
        for k in 0..rings {
            let z = length * k as f64 / (rings - 1) as f64;
            for j in 0..segments {
                let a = TAU * j as f64 / segments as f64;
                points.push(Point3::new(r * a.cos(), r * a.sin(), z));
            }
        }
        points
    }

    fn axis(length: f64) -> Vec<Point3<f64>> {
        (0..=length as usize)
            .map(|i| Point3::new(0.0, 0.0, i as f64))
            .collect()
    }

    #[test]
    fn test_getters_empty_before_init() {
        let points = tube_points(5.0, 50.0, 11, 12);
        let centerline = axis(50.0);
        let segmenter = DefectSegmenter::new(&points, &centerline, SegmentParams::default()).unwrap();
        assert!(segmenter.distances().is_empty());
        assert!(segmenter.defects().is_empty());
        assert!(segmenter.patches().is_empty());
        assert!(segmenter.residuals().is_empty());
        assert_eq!(segmenter.patch_count(), 0);
        assert_eq!(segmenter.patch_of(0), None);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = DefectSegmenter::new(&[], &[], SegmentParams::default().with_bin_width(0.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_inputs() {
        let points = tube_points(5.0, 50.0, 11, 12);
        let result = segment_defects(&points, &[], &SegmentParams::default()).unwrap();
        assert!(result.distances.is_empty());
        assert!(result.defects.is_empty());
        assert_eq!(result.patch_count, 0);

        let result = segment_defects(&[], &axis(50.0), &SegmentParams::default()).unwrap();
        assert!(result.distances.is_empty());
        assert_eq!(result.patch_count, 0);
    }

    #[test]
    fn test_single_point_centerline() {
        let points = tube_points(5.0, 10.0, 3, 8);
        let center = [Point3::new(0.0, 0.0, 5.0)];
        let result = segment_defects(&points, &center, &SegmentParams::default()).unwrap();

        assert_eq!(result.patch_count, 1);
        assert!(result.patches.iter().all(|&p| p == 0));
        for (p, d) in points.iter().zip(&result.distances) {
            assert_relative_eq!(*d, (p - center[0]).norm(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_short_centerline_is_one_patch() {
        let points = tube_points(5.0, 10.0, 6, 8);
        let result = segment_defects(&points, &axis(10.0), &SegmentParams::default()).unwrap();
        assert_eq!(result.patch_count, 1);
        assert!(result.patches.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_patch_layout() {
        let points = tube_points(5.0, 100.0, 51, 36);
        let params = SegmentParams::default().with_patch_width(25.0).with_patch_height(4);
        let result = segment_defects(&points, &axis(100.0), &params).unwrap();

        assert_eq!(result.arc_bins, 4);
        assert_eq!(result.bands, 4);
        assert_eq!(result.patch_count, 16);
        assert!(result.patches.iter().all(|&p| p < 16));
        // Every patch of a uniform tube is populated
        assert_eq!(result.patch_stats.len(), 16);
        // The last point sits at the end of the centerline, in the last arc bin
        assert_eq!(result.patches[points.len() - 1] / 4, 3);
    }

    #[test]
    fn test_tiny_patch_width_caps_arc_bins() {
        let points = tube_points(5.0, 100.0, 51, 36);
        let params = SegmentParams::default().with_patch_width(1e-300);
        let result = segment_defects(&points, &axis(100.0), &params).unwrap();

        assert_eq!(result.arc_bins, MAX_ARC_BINS);
        assert_eq!(result.patch_count, MAX_ARC_BINS * 100);
        assert!(result.patches.iter().all(|&p| p < result.patch_count));
        // The last ring still lands in the last arc bin
        assert_eq!(result.patches[points.len() - 1] / 100, MAX_ARC_BINS - 1);
        assert_eq!(result.distances.len(), points.len());
    }

    #[test]
    fn test_overflowing_grid_is_one_patch() {
        let p = Point3::new(5.0, 0.0, 50.0);
        let params = SegmentParams::default()
            .with_patch_width(1e-300)
            .with_patch_height(usize::MAX);
        let result = segment_defects(&[p], &axis(100.0), &params).unwrap();
        assert_eq!(result.patch_count, 1);
        assert_eq!(result.patches, vec![0]);
        assert_relative_eq!(result.distances[0], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_tube_has_no_defects() {
        let points = tube_points(5.0, 100.0, 51, 36);
        let result = segment_defects(&points, &axis(100.0), &SegmentParams::default()).unwrap();
        assert!(result.defects.is_empty());
        for (d, r) in result.distances.iter().zip(&result.residuals) {
            assert_relative_eq!(*d, 5.0, epsilon = 1e-9);
            assert!(*r < 1e-9);
        }
    }

    #[test]
    fn test_bulge_is_flagged() {
        let mut points = tube_points(5.0, 100.0, 51, 36);
        let bulge = 25 * 36 + 3;
        points[bulge].x *= 2.0;
        points[bulge].y *= 2.0;

        let params = SegmentParams::default().with_patch_height(10).with_bin_width(1.0);
        let centerline = axis(100.0);
        let mut segmenter = DefectSegmenter::new(&points, &centerline, params).unwrap();
        segmenter.init();
        let first = segmenter.defects().to_vec();
        assert_eq!(first, vec![bulge]);
        assert_relative_eq!(segmenter.residuals()[bulge], 5.0, epsilon = 1e-9);

        segmenter.init();
        assert_eq!(segmenter.defects(), first.as_slice());
    }

    #[test]
    fn test_sparse_patches_fall_back() {
        let points = tube_points(5.0, 100.0, 51, 36);
        // 360 bands leave at most one angle, 13 rings, per patch
        let params = SegmentParams::default()
            .with_patch_height(360)
            .with_min_patch_points(20);
        let result = segment_defects(&points, &axis(100.0), &params).unwrap();
        assert!(result.fallback_count(StatsSource::Ring) > 0);
        assert_eq!(result.fallback_count(StatsSource::Patch), 0);
        assert!(result.defects.is_empty());
    }

    #[test]
    fn test_global_fallback() {
        let points = tube_points(5.0, 100.0, 51, 36);
        let params = SegmentParams::default().with_min_patch_points(1_000_000);
        let result = segment_defects(&points, &axis(100.0), &params).unwrap();
        assert_eq!(result.fallback_count(StatsSource::Global), result.thresholds.len());
    }

    #[test]
    fn test_defect_flags() {
        let result = Segmentation {
            distances: vec![0.0; 5],
            defects: vec![1, 4],
            ..Segmentation::default()
        };
        assert_eq!(result.defect_flags(), vec![false, true, false, false, true]);
        assert!(result.is_defect(4));
        assert!(!result.is_defect(2));
    }
}
