//! Surface elements and the least-squares geometry built on them.
//!
//! Every face of the input contributes one [`SurfaceElement`]. The tracker
//! only ever looks at these: a position, an inward direction and a weight.

use mesh_types::{MeshTopology, Point3, PolyMesh, Vector3};
use nalgebra::Matrix3;
use rayon::prelude::*;

/// Relative eigenvalue floor below which an eigen-direction is ignored.
const RELATIVE_EIGEN_FLOOR: f64 = 1e-3;

/// One face reduced to what the tracker needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SurfaceElement {
    /// Vertex mean of the face.
    pub centroid: Point3<f64>,
    /// Unit normal pointing toward the tube interior.
    pub inward: Vector3<f64>,
    /// Face area, used as the weight.
    pub area: f64,
}

/// Build one element per face with non-zero area, in face order.
pub(crate) fn surface_elements(mesh: &PolyMesh, invert_normal: bool) -> Vec<SurfaceElement> {
    (0..mesh.face_count())
        .into_par_iter()
        .filter_map(|i| {
            let polygon = mesh.polygon(i)?;
            let newell = polygon.normal_unnormalized();
            let length = newell.norm();
            if length <= f64::EPSILON || !length.is_finite() {
                return None;
            }
            let outward = newell / length;
            Some(SurfaceElement {
                centroid: polygon.centroid(),
                inward: if invert_normal { outward } else { -outward },
                area: length * 0.5,
            })
        })
        .collect()
}

/// Eigen-decomposition of a symmetric 3x3 matrix, sorted ascending.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SortedEigen {
    pub values: [f64; 3],
    pub vectors: [Vector3<f64>; 3],
}

impl SortedEigen {
    pub fn new(matrix: Matrix3<f64>) -> Self {
        let eigen = matrix.symmetric_eigen();
        let mut order = [0_usize, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
        Self {
            values: order.map(|i| eigen.eigenvalues[i]),
            vectors: order.map(|i| eigen.eigenvectors.column(i).into_owned()),
        }
    }

    fn trace(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Area-weighted normal scatter `Σ a·n nᵀ` over the selected elements.
fn normal_scatter(elements: &[SurfaceElement], ids: &[usize]) -> Matrix3<f64> {
    ids.iter().fold(Matrix3::zeros(), |acc, &i| {
        let e = &elements[i];
        acc + e.inward * e.inward.transpose() * e.area
    })
}

/// Direction the selected normals are all perpendicular to.
///
/// For a ring of faces around a tube this is the tube axis: the eigenvector
/// with the smallest eigenvalue of the normal scatter. Returns `None` when
/// the normals span less than a plane, which is the case for a flat patch.
pub(crate) fn axis_of_normals(elements: &[SurfaceElement], ids: &[usize]) -> Option<Vector3<f64>> {
    let eigen = SortedEigen::new(normal_scatter(elements, ids));
    let trace = eigen.trace();
    if !trace.is_finite() || trace <= 0.0 || eigen.values[1] <= RELATIVE_EIGEN_FLOOR * trace {
        return None;
    }
    let axis = eigen.vectors[0];
    let length = axis.norm();
    (length > f64::EPSILON).then(|| axis / length)
}

/// Area-weighted centroid of the selected elements.
pub(crate) fn weighted_centroid(elements: &[SurfaceElement], ids: &[usize]) -> Option<Point3<f64>> {
    let (sum, weight) = ids.iter().fold((Vector3::zeros(), 0.0), |(sum, w), &i| {
        let e = &elements[i];
        (sum + e.centroid.coords * e.area, w + e.area)
    });
    (weight > 0.0).then(|| Point3::from(sum / weight))
}

/// Area-weighted mean distance of the selected centroids from the line
/// through `origin` along the unit vector `axis`.
pub(crate) fn mean_lateral_distance(
    elements: &[SurfaceElement],
    ids: &[usize],
    origin: &Point3<f64>,
    axis: &Vector3<f64>,
) -> f64 {
    let (sum, weight) = ids.iter().fold((0.0, 0.0), |(sum, w), &i| {
        let e = &elements[i];
        let lateral = lateral_part(&(e.centroid - origin), axis).norm();
        (sum + lateral * e.area, w + e.area)
    });
    if weight > 0.0 { sum / weight } else { 0.0 }
}

/// Component of `v` perpendicular to the unit vector `axis`.
pub(crate) fn lateral_part(v: &Vector3<f64>, axis: &Vector3<f64>) -> Vector3<f64> {
    v - axis * v.dot(axis)
}

/// Least-squares point nearest to the normal lines of the selected elements.
///
/// Minimizes `Σ a·|(I − n nᵀ)(x − c)|²`. Directions the system does not
/// constrain (the tube axis, for a ring) keep the coordinate of `anchor`.
/// After the first solve, lines passing farther than `outlier_distance`
/// from the estimate are dropped and the system is solved again, so a few
/// faces on a dent or bump cannot drag the center sideways.
pub(crate) fn nearest_point_to_normal_lines(
    elements: &[SurfaceElement],
    ids: &[usize],
    anchor: &Point3<f64>,
    outlier_distance: f64,
) -> Point3<f64> {
    let first = solve_normal_lines(elements, ids, anchor);
    let inliers: Vec<usize> = ids
        .iter()
        .copied()
        .filter(|&i| line_distance(&elements[i], &first) <= outlier_distance)
        .collect();
    if inliers.len() >= 3 && inliers.len() < ids.len() {
        solve_normal_lines(elements, &inliers, anchor)
    } else {
        first
    }
}

fn solve_normal_lines(
    elements: &[SurfaceElement],
    ids: &[usize],
    anchor: &Point3<f64>,
) -> Point3<f64> {
    let mut a = Matrix3::zeros();
    let mut b = Vector3::zeros();
    for &i in ids {
        let e = &elements[i];
        let projector = (Matrix3::identity() - e.inward * e.inward.transpose()) * e.area;
        a += projector;
        b += projector * e.centroid.coords;
    }

    let eigen = SortedEigen::new(a);
    let largest = eigen.values[2];
    if !largest.is_finite() || largest <= 0.0 {
        return *anchor;
    }

    // Pseudo-inverse correction restricted to well-conditioned directions
    let residual = b - a * anchor.coords;
    let mut x = *anchor;
    for (value, vector) in eigen.values.iter().zip(&eigen.vectors) {
        if *value > RELATIVE_EIGEN_FLOOR * largest {
            x += vector * (vector.dot(&residual) / value);
        }
    }
    x
}

fn line_distance(element: &SurfaceElement, point: &Point3<f64>) -> f64 {
    lateral_part(&(point - element.centroid), &element.inward).norm()
}
