//! Polygon type for geometric calculations.

use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

/// A planar-ish polygon with concrete vertex positions.
///
/// This is a utility type for per-face geometry. It stores the resolved
/// positions rather than indices, and works for triangles, quads and
/// larger polygons alike.
///
/// Winding is **counter-clockwise (CCW) when viewed from the front**
/// (normal points toward viewer).
///
/// # Example
///
/// ```
/// use mesh_types::{Polygon, Point3};
///
/// let quad = Polygon::new([
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(2.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ]);
///
/// assert!((quad.area() - 2.0).abs() < 1e-10);
/// let normal = quad.normal().unwrap();
/// assert!((normal.z - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: SmallVec<[Point3<f64>; 4]>,
}

impl Polygon {
    /// Create a polygon from its corner positions, in winding order.
    #[must_use]
    pub fn new(vertices: impl IntoIterator<Item = Point3<f64>>) -> Self {
        Self {
            vertices: vertices.into_iter().collect(),
        }
    }

    /// Corner positions in winding order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Number of corners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if the polygon has no corners.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Compute the (unnormalized) Newell normal.
    ///
    /// The direction follows the right-hand rule with CCW winding. For a
    /// planar polygon the magnitude equals twice its area. Slightly
    /// non-planar polygons get the normal of their best-fit plane.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Polygon, Point3};
    ///
    /// let tri = Polygon::new([
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(0.0, 2.0, 0.0),
    /// ]);
    ///
    /// // Magnitude = 2 * area = 2 * 2 = 4
    /// assert!((tri.normal_unnormalized().norm() - 4.0).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let n = self.vertices.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal
    }

    /// Compute the unit face normal.
    ///
    /// Returns `None` for degenerate polygons (zero area or fewer than
    /// three corners).
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        if self.vertices.len() < 3 {
            return None;
        }
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the polygon.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the vertex centroid (mean of the corners).
    ///
    /// Returns the origin for an empty polygon.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }
}
