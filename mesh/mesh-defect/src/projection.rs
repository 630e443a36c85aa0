//! Nearest-point projection onto a centerline.
//!
//! Segments are grouped into consecutive chunks, each wrapped in a bounding
//! sphere. A query visits chunks nearest-first and stops as soon as no
//! remaining sphere can hold a closer segment, so the answer is the same as
//! checking every segment.

// Chunk sizes are small; the cast to f64 is exact.
#![allow(clippy::cast_precision_loss)]

use curve_types::{Polyline, PolylineProjection};
use mesh_types::Point3;
use rayon::prelude::*;

/// Segments per bounding-sphere chunk.
const CHUNK_SEGMENTS: usize = 16;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Chunk {
    first: usize,
    end: usize,
    center: Point3<f64>,
    radius: f64,
}

/// A centerline prepared for repeated projection queries.
#[derive(Debug, Clone)]
pub(crate) enum CenterlineIndex {
    /// A single centerline point.
    Point(Point3<f64>),
    /// A polyline with its segment chunks.
    Polyline {
        polyline: Polyline,
        chunks: Vec<Chunk>,
    },
}

impl CenterlineIndex {
    /// Index a centerline. Returns `None` for an empty or non-finite one.
    pub fn build(centerline: &[Point3<f64>]) -> Option<Self> {
        match centerline {
            [] => None,
            [single] => single
                .coords
                .iter()
                .all(|c| c.is_finite())
                .then_some(Self::Point(*single)),
            _ => {
                let polyline = Polyline::try_new(centerline.to_vec()).ok()?;
                let chunks = chunk_segments(polyline.vertices());
                Some(Self::Polyline { polyline, chunks })
            }
        }
    }

    /// The underlying polyline, if the centerline has at least two points.
    pub const fn polyline(&self) -> Option<&Polyline> {
        match self {
            Self::Point(_) => None,
            Self::Polyline { polyline, .. } => Some(polyline),
        }
    }

    /// Closest centerline point to `point`.
    ///
    /// Ties resolve to the lowest segment index.
    pub fn project(&self, point: &Point3<f64>) -> PolylineProjection {
        match self {
            Self::Point(center) => PolylineProjection {
                point: *center,
                segment: 0,
                local_t: 0.0,
                arc: 0.0,
                distance: (point - center).norm(),
            },
            Self::Polyline { polyline, chunks } => project_pruned(polyline, chunks, point),
        }
    }

    /// Project every point, in parallel, in input order.
    pub fn project_all(&self, points: &[Point3<f64>]) -> Vec<PolylineProjection> {
        points.par_iter().map(|p| self.project(p)).collect()
    }
}

fn chunk_segments(vertices: &[Point3<f64>]) -> Vec<Chunk> {
    let segments = vertices.len().saturating_sub(1);
    (0..segments)
        .step_by(CHUNK_SEGMENTS)
        .map(|first| {
            let end = (first + CHUNK_SEGMENTS).min(segments);
            let span = &vertices[first..=end];
            let center = Point3::from(
                span.iter().fold(nalgebra::Vector3::zeros(), |acc, v| acc + v.coords)
                    / span.len() as f64,
            );
            let radius = span
                .iter()
                .map(|v| (v - center).norm())
                .fold(0.0, f64::max);
            Chunk {
                first,
                end,
                center,
                radius,
            }
        })
        .collect()
}

fn project_pruned(polyline: &Polyline, chunks: &[Chunk], point: &Point3<f64>) -> PolylineProjection {
    let mut order: Vec<(f64, usize)> = chunks
        .iter()
        .enumerate()
        .map(|(i, c)| (((point - c.center).norm() - c.radius).max(0.0), i))
        .collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut best: Option<PolylineProjection> = None;
    for (lower_bound, i) in order {
        if best.as_ref().is_some_and(|b| lower_bound > b.distance) {
            break;
        }
        let chunk = &chunks[i];
        for segment in chunk.first..chunk.end {
            let Some(candidate) = polyline.project_onto_segment(segment, point) else {
                continue;
            };
            let closer = best.as_ref().is_none_or(|b| {
                candidate
                    .distance
                    .total_cmp(&b.distance)
                    .then(candidate.segment.cmp(&b.segment))
                    .is_lt()
            });
            if closer {
                best = Some(candidate);
            }
        }
    }

    // Chunks cover every segment and the polyline has at least one
    best.unwrap_or_else(|| polyline.project(point))
}
