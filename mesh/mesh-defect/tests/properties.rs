//! Property-based tests for defect segmentation.
//!
//! Run with: cargo test -p mesh-defect -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_precision_loss)]

use curve_types::{Curve, Polyline};
use mesh_defect::{DefectSegmenter, SegmentParams, segment_defects};
use mesh_types::{Point3, Vector3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point(range: f64) -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-range..range).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// A wandering centerline of 2 to 30 points.
fn arb_centerline() -> impl Strategy<Value = Vec<Point3<f64>>> {
    (arb_point(5.0), prop::collection::vec(arb_point(4.0), 1..30)).prop_map(|(start, steps)| {
        let mut points = vec![start];
        for step in steps {
            let last = points[points.len() - 1];
            points.push(last + step.coords + Vector3::new(0.0, 0.0, 3.0));
        }
        points
    })
}

fn arb_cloud() -> impl Strategy<Value = Vec<Point3<f64>>> {
    prop::collection::vec(arb_point(40.0), 1..200)
}

fn arb_params() -> impl Strategy<Value = SegmentParams> {
    (1.0..40.0f64, 1usize..16, 0.1..5.0f64, 0.0..4.0f64, 0usize..12).prop_map(
        |(width, height, bin, sigma, min_points)| {
            SegmentParams::default()
                .with_patch_width(width)
                .with_patch_height(height)
                .with_bin_width(bin)
                .with_sigma_factor(sigma)
                .with_min_patch_points(min_points)
        },
    )
}

// =============================================================================
// Distance Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn distances_match_exhaustive_projection(
        centerline in arb_centerline(),
        cloud in arb_cloud(),
        params in arb_params(),
    ) {
        let result = segment_defects(&cloud, &centerline, &params).unwrap();
        let polyline = Polyline::try_new(centerline).unwrap();

        prop_assert_eq!(result.distances.len(), cloud.len());
        for (p, d) in cloud.iter().zip(&result.distances) {
            prop_assert!(*d >= 0.0);
            let exact = polyline.project(p).distance;
            prop_assert!((d - exact).abs() < 1e-9, "distance {} vs exhaustive {}", d, exact);
        }
    }

    #[test]
    fn init_is_idempotent(
        centerline in arb_centerline(),
        cloud in arb_cloud(),
        params in arb_params(),
    ) {
        let mut segmenter = DefectSegmenter::new(&cloud, &centerline, params).unwrap();
        segmenter.init();
        let defects = segmenter.defects().to_vec();
        let distances = segmenter.distances().to_vec();
        let patches = segmenter.patches().to_vec();

        segmenter.init();
        prop_assert_eq!(segmenter.defects(), defects.as_slice());
        prop_assert_eq!(segmenter.distances(), distances.as_slice());
        prop_assert_eq!(segmenter.patches(), patches.as_slice());
    }
}

// =============================================================================
// Threshold Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wider_bins_never_add_defects(
        centerline in arb_centerline(),
        cloud in arb_cloud(),
        params in arb_params(),
        extra in 0.0..10.0f64,
    ) {
        let narrow = segment_defects(&cloud, &centerline, &params).unwrap();
        let wide_params = params.clone().with_bin_width(params.bin_width + extra);
        let wide = segment_defects(&cloud, &centerline, &wide_params).unwrap();

        prop_assert!(wide.defects.len() <= narrow.defects.len());
        for i in &wide.defects {
            prop_assert!(narrow.is_defect(*i));
        }
    }

    #[test]
    fn residuals_are_non_negative(
        centerline in arb_centerline(),
        cloud in arb_cloud(),
        params in arb_params(),
    ) {
        let result = segment_defects(&cloud, &centerline, &params).unwrap();
        prop_assert_eq!(result.residuals.len(), cloud.len());
        prop_assert!(result.residuals.iter().all(|r| *r >= 0.0));
        for pair in result.defects.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }
}

// =============================================================================
// Patch Coverage
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_point_has_one_patch(
        centerline in arb_centerline(),
        cloud in arb_cloud(),
        params in arb_params(),
    ) {
        let result = segment_defects(&cloud, &centerline, &params).unwrap();
        prop_assert_eq!(result.patches.len(), cloud.len());
        prop_assert!(result.patches.iter().all(|&p| p < result.patch_count));

        // Every occupied patch has a threshold, and their sizes add up
        let total: usize = result.patch_stats.values().map(|s| s.count).sum();
        prop_assert_eq!(total, cloud.len());
        for id in result.patch_stats.keys() {
            prop_assert!(result.thresholds.contains_key(id));
        }
    }

    #[test]
    fn arc_bins_cover_the_centerline(
        centerline in arb_centerline(),
        cloud in arb_cloud(),
        params in arb_params(),
    ) {
        let result = segment_defects(&cloud, &centerline, &params).unwrap();
        let length = Polyline::try_new(centerline).unwrap().arc_length();

        if length < params.patch_width {
            prop_assert_eq!(result.patch_count, 1);
        } else {
            let covered = result.arc_bins as f64 * params.patch_width;
            prop_assert!(covered >= length - 1e-9);
            prop_assert!(covered - params.patch_width < length + 1e-9);
            prop_assert_eq!(result.patch_count, result.arc_bins * params.patch_height);
        }
        for (arc, patch) in result.arcs.iter().zip(&result.patches) {
            prop_assert!(*arc >= 0.0 && *arc <= length + 1e-9);
            prop_assert!(patch / result.bands < result.arc_bins);
        }
    }
}

// =============================================================================
// Degenerate Inputs
// =============================================================================

#[test]
fn empty_cloud_has_no_defects() {
    let centerline = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 50.0)];
    let result = segment_defects(&[], &centerline, &SegmentParams::default()).unwrap();
    assert!(result.defects.is_empty());
    assert!(result.distances.is_empty());
}

#[test]
fn one_point_centerline_is_one_patch() {
    let cloud: Vec<_> = (0..50)
        .map(|i| Point3::new(f64::from(i), 3.0, -1.0))
        .collect();
    let centerline = [Point3::new(0.0, 0.0, 0.0)];
    let result = segment_defects(&cloud, &centerline, &SegmentParams::default()).unwrap();

    assert_eq!(result.patch_count, 1);
    assert_eq!(result.distances.len(), cloud.len());
    assert!(result.patches.iter().all(|&p| p == 0));
}

#[test]
fn coincident_centerline_is_one_patch() {
    let cloud = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0)];
    let centerline = vec![Point3::new(0.0, 0.0, 0.0); 5];
    let result = segment_defects(&cloud, &centerline, &SegmentParams::default()).unwrap();
    assert_eq!(result.patch_count, 1);
    assert!((result.distances[1] - 2.0).abs() < 1e-12);
}
