//! Accumulation-based centerline tracking.
//!
//! The tracker walks through the interior of a tube. At each step it looks
//! at the slab of faces around the next candidate position: their normals
//! are perpendicular to the local axis, and their normal lines meet near
//! the local center. The first gives the new direction, the second pulls
//! the position back onto the axis.

// Mesh processing uses indices; casts are safe for practical mesh sizes.
#![allow(clippy::cast_precision_loss)]

use cf_spatial::VoxelGrid;
use mesh_types::{MeshTopology, Point3, PolyMesh, Vector3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::TrackParams;
use crate::surface::{
    SortedEigen, SurfaceElement, axis_of_normals, lateral_part, mean_lateral_distance,
    nearest_point_to_normal_lines, surface_elements, weighted_centroid,
};

/// Faces whose normal is this aligned with the travel direction are caps or
/// flanges, not tube wall, and do not vote.
const AXIAL_NORMAL_LIMIT: f64 = 0.7;

/// A visited cell only counts as a cycle when it was last entered more than
/// this many steps ago.
const CYCLE_MIN_AGE: usize = 3;

/// Why tracking stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// Too few faces ahead, or the remaining support lies behind the
    /// candidate position. This is the normal end of a tube.
    LostSurface,
    /// The step limit was reached.
    MaxSteps,
    /// The walk came back to a region it had left.
    Cycle,
    /// No start position could be found.
    NoSeed,
    /// The parameters failed validation.
    InvalidParams,
}

impl StopReason {
    /// Short snake-case name, as used in run summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LostSurface => "lost_surface",
            Self::MaxSteps => "max_steps",
            Self::Cycle => "cycle",
            Self::NoSeed => "no_seed",
            Self::InvalidParams => "invalid_params",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`track_centerline`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackResult {
    /// Centerline points in travel order, seed first.
    pub points: Vec<Point3<f64>>,
    /// Why the walk ended.
    pub stop: StopReason,
    /// Tube radius estimate at the last accepted point.
    pub ring_radius: f64,
}

impl TrackResult {
    /// A result with no points.
    #[must_use]
    pub const fn stopped(stop: StopReason) -> Self {
        Self {
            points: Vec::new(),
            stop,
            ring_radius: 0.0,
        }
    }

    /// Whether no centerline was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of tracked points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Length of the polyline through the tracked points.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// Track the centerline of a tubular mesh.
///
/// The walk starts at the end of the tube with the smallest coordinate along
/// its dominant axis and follows the tube until the surface runs out. Invalid
/// parameters and meshes without a usable start yield an empty result; this
/// function never panics.
///
/// # Example
///
/// ```
/// use mesh_centerline::{StopReason, TrackParams, track_centerline};
/// use mesh_types::open_cylinder;
///
/// let tube = open_cylinder(10.0, 60.0, 31, 36);
/// let result = track_centerline(&tube, &TrackParams::new(5.0, 1.0));
///
/// assert_eq!(result.stop, StopReason::LostSurface);
/// assert!(result.points.iter().all(|p| p.x.hypot(p.y) < 1.0));
/// ```
#[must_use]
pub fn track_centerline(mesh: &PolyMesh, params: &TrackParams) -> TrackResult {
    if let Err(err) = params.validate() {
        warn!(%err, "Refusing to track centerline");
        return TrackResult::stopped(StopReason::InvalidParams);
    }

    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        acc_radius = params.acc_radius,
        track_step = params.track_step,
        "Tracking centerline"
    );

    let elements = surface_elements(mesh, params.invert_normal);
    let Some(seed) = find_seed(&elements, params) else {
        warn!(usable_faces = elements.len(), "No centerline seed found");
        return TrackResult::stopped(StopReason::NoSeed);
    };

    debug!(
        x = seed.position.x,
        y = seed.position.y,
        z = seed.position.z,
        ring_radius = seed.ring_radius,
        "Seeded centerline"
    );

    let tracker = Tracker::new(&elements, params, seed.ring_radius);
    let result = tracker.walk(seed);

    info!(
        points = result.points.len(),
        stop = %result.stop,
        ring_radius = result.ring_radius,
        "Centerline tracking finished"
    );
    result
}

/// Position, direction and radius estimate between steps.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    position: Point3<f64>,
    direction: Vector3<f64>,
    ring_radius: f64,
}

/// Start of the walk at the low end of the dominant axis.
fn find_seed(elements: &[SurfaceElement], params: &TrackParams) -> Option<Cursor> {
    if elements.len() < params.min_support {
        return None;
    }

    let e0 = dominant_axis(elements)?;
    let along: Vec<f64> = elements.iter().map(|e| e.centroid.coords.dot(&e0)).collect();
    let start = along.iter().copied().fold(f64::INFINITY, f64::min);

    let slab: Vec<usize> = (0..elements.len())
        .filter(|&i| {
            along[i] <= start + params.acc_radius
                && elements[i].inward.dot(&e0).abs() < AXIAL_NORMAL_LIMIT
        })
        .collect();
    if slab.len() < params.min_support {
        return None;
    }

    let mut direction = axis_of_normals(elements, &slab)?;
    if direction.dot(&e0) < 0.0 {
        direction = -direction;
    }

    let centroid = weighted_centroid(elements, &slab)?;
    let nearest =
        nearest_point_to_normal_lines(elements, &slab, &centroid, params.acc_radius * 0.5);
    let position = centroid + lateral_part(&(nearest - centroid), &direction);
    let ring_radius = mean_lateral_distance(elements, &slab, &position, &direction);

    Some(Cursor {
        position,
        direction,
        ring_radius,
    })
}

/// Principal axis of the area-weighted face centroids.
///
/// The sign is fixed so the largest-magnitude component is positive.
fn dominant_axis(elements: &[SurfaceElement]) -> Option<Vector3<f64>> {
    let all: Vec<usize> = (0..elements.len()).collect();
    let mean = weighted_centroid(elements, &all)?;
    let total: f64 = elements.iter().map(|e| e.area).sum();

    let covariance = elements
        .iter()
        .fold(nalgebra::Matrix3::zeros(), |acc, e| {
            let offset = e.centroid - mean;
            acc + offset * offset.transpose() * e.area
        })
        / total;

    let mut axis = SortedEigen::new(covariance).vectors[2];
    if axis[axis.iamax()] < 0.0 {
        axis = -axis;
    }
    Some(axis)
}

struct Tracker<'a> {
    elements: &'a [SurfaceElement],
    params: &'a TrackParams,
    faces: VoxelGrid<Vec<usize>>,
}

impl<'a> Tracker<'a> {
    fn new(elements: &'a [SurfaceElement], params: &'a TrackParams, ring_radius: f64) -> Self {
        let cell = params.acc_radius.max(ring_radius * 0.5);
        let mut faces: VoxelGrid<Vec<usize>> = VoxelGrid::new(cell);
        for (i, e) in elements.iter().enumerate() {
            let coord = faces.world_to_grid(e.centroid);
            faces.get_or_insert_default(coord).push(i);
        }
        Self {
            elements,
            params,
            faces,
        }
    }

    fn walk(&self, seed: Cursor) -> TrackResult {
        let mut visited: VoxelGrid<usize> = VoxelGrid::new(self.params.track_step);
        visited.set(visited.world_to_grid(seed.position), 0);

        let mut points = vec![seed.position];
        let mut cursor = seed;

        let stop = 'walk: {
            for step in 1..=self.params.max_steps {
                let next = match self.advance(&cursor) {
                    Ok(next) => next,
                    Err(reason) => break 'walk reason,
                };

                let cell = visited.world_to_grid(next.position);
                if let Some(&entered) = visited.get(cell) {
                    if step - entered > CYCLE_MIN_AGE {
                        break 'walk StopReason::Cycle;
                    }
                }
                visited.set(cell, step);

                points.push(next.position);
                cursor = next;
            }
            StopReason::MaxSteps
        };

        TrackResult {
            points,
            stop,
            ring_radius: cursor.ring_radius,
        }
    }

    /// Take one step from `cursor`.
    fn advance(&self, cursor: &Cursor) -> Result<Cursor, StopReason> {
        let r = self.params.acc_radius;
        let d = cursor.direction;
        let q = cursor.position + d * self.params.track_step;

        let support = self.support(&q, &d, r.max(2.0 * cursor.ring_radius));
        if support.len() < self.params.min_support {
            return Err(StopReason::LostSurface);
        }

        let (axial, weight) = support.iter().fold((0.0, 0.0), |(sum, w), &i| {
            let e = &self.elements[i];
            (sum + (e.centroid - q).dot(&d) * e.area, w + e.area)
        });
        if weight <= 0.0 || axial / weight < -0.5 * r {
            return Err(StopReason::LostSurface);
        }

        let direction = match axis_of_normals(self.elements, &support) {
            Some(estimate) => {
                let aligned = if estimate.dot(&d) < 0.0 { -estimate } else { estimate };
                (d + aligned).try_normalize(f64::EPSILON).unwrap_or(d)
            }
            None => d,
        };

        let nearest = nearest_point_to_normal_lines(self.elements, &support, &q, 0.5 * r);
        let shift = lateral_part(&(nearest - q), &direction);
        let shift = if shift.norm() > self.params.track_step {
            shift.normalize() * self.params.track_step
        } else {
            shift
        };
        let position = q + shift;

        Ok(Cursor {
            position,
            direction,
            ring_radius: mean_lateral_distance(self.elements, &support, &position, &direction),
        })
    }

    /// Faces that vote for the center near `q`, in ascending index order.
    fn support(&self, q: &Point3<f64>, d: &Vector3<f64>, lateral_limit: f64) -> Vec<usize> {
        let r = self.params.acc_radius;
        let reach = r.hypot(lateral_limit);

        let mut candidates: Vec<usize> = self
            .faces
            .query_radius(*q, reach)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        candidates.sort_unstable();

        candidates
            .into_par_iter()
            .filter(|&i| {
                let e = &self.elements[i];
                let offset = e.centroid - q;
                offset.dot(d).abs() <= r
                    && lateral_part(&offset, d).norm() <= lateral_limit
                    && (-offset).dot(&e.inward) > 0.0
                    && e.inward.dot(d).abs() < AXIAL_NORMAL_LIMIT
            })
            .collect()
    }
}
