//! Polyline (piecewise linear) curves.
//!
//! A polyline is a sequence of connected line segments defined by vertices.
//! Centerlines are stored as polylines, and every surface point is measured
//! against one through [`Polyline::project`].

use crate::{Curve, CurveError, Result};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A piecewise linear curve defined by a sequence of vertices.
///
/// # Parameterization
///
/// The parameter `t ∈ [0, 1]` maps to the polyline based on arc length.
/// - `t = 0`: First vertex
/// - `t = 1`: Last vertex
/// - `t = 0.5`: Point at half the total arc length
///
/// # Example
///
/// ```
/// use curve_types::{Polyline, Curve};
/// use nalgebra::Point3;
///
/// let polyline = Polyline::try_new(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
/// ]).unwrap();
///
/// assert!((polyline.arc_length() - 2.0).abs() < 1e-10);
///
/// let mid = polyline.point_at(0.5);
/// assert!((mid.x - 1.0).abs() < 1e-10);
/// assert!(mid.y.abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline {
    vertices: Vec<Point3<f64>>,
    /// Cumulative arc lengths at each vertex.
    cumulative_lengths: Vec<f64>,
    total_length: f64,
}

/// Closest point on a polyline to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineProjection {
    /// Closest point on the polyline.
    pub point: Point3<f64>,
    /// Index of the segment holding the closest point.
    pub segment: usize,
    /// Position within the segment, in `[0, 1]`.
    pub local_t: f64,
    /// Arc length from the first vertex to the closest point.
    pub arc: f64,
    /// Euclidean distance from the query point to the closest point.
    pub distance: f64,
}

impl Polyline {
    /// Try to create a new polyline.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InsufficientPoints`] if fewer than 2 vertices are
    /// given, or [`CurveError::NonFinite`] if a coordinate is NaN or infinite.
    pub fn try_new(vertices: Vec<Point3<f64>>) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(CurveError::insufficient_points(2, vertices.len()));
        }
        if let Some(index) = vertices
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(CurveError::NonFinite { index });
        }

        Ok(Self::from_valid(vertices))
    }

    fn from_valid(vertices: Vec<Point3<f64>>) -> Self {
        let mut cumulative_lengths = Vec::with_capacity(vertices.len());
        let mut total_length = 0.0;
        cumulative_lengths.push(0.0);
        for pair in vertices.windows(2) {
            total_length += (pair[1] - pair[0]).norm();
            cumulative_lengths.push(total_length);
        }

        Self {
            vertices,
            cumulative_lengths,
            total_length,
        }
    }

    /// Get the vertices of the polyline.
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Consume the polyline, returning its vertices.
    #[must_use]
    pub fn into_vertices(self) -> Vec<Point3<f64>> {
        self.vertices
    }

    /// Get the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false`; a polyline holds at least two vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get the number of segments (edges).
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Arc length from the first vertex to vertex `index`.
    #[must_use]
    pub fn arc_at_vertex(&self, index: usize) -> Option<f64> {
        self.cumulative_lengths.get(index).copied()
    }

    /// Get a segment as a pair of points.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<(&Point3<f64>, &Point3<f64>)> {
        if index < self.num_segments() {
            Some((&self.vertices[index], &self.vertices[index + 1]))
        } else {
            None
        }
    }

    /// Get the unit direction of a segment, or `None` for a zero-length one.
    #[must_use]
    pub fn segment_direction(&self, index: usize) -> Option<Vector3<f64>> {
        self.segment(index).and_then(|(a, b)| (b - a).try_normalize(1e-12))
    }

    /// Find which segment contains the given arc length.
    ///
    /// Returns `(segment_index, local_t)` where `local_t ∈ [0, 1]`.
    fn segment_at_arc(&self, arc: f64) -> (usize, f64) {
        if arc <= 0.0 {
            return (0, 0.0);
        }
        if arc >= self.total_length {
            return (self.num_segments() - 1, 1.0);
        }

        // First cumulative length >= arc
        let hi = self.cumulative_lengths.partition_point(|&c| c < arc);
        let seg_idx = hi.saturating_sub(1).min(self.num_segments() - 1);
        let seg_start = self.cumulative_lengths[seg_idx];
        let seg_len = self.cumulative_lengths[seg_idx + 1] - seg_start;

        let local_t = if seg_len > 1e-10 {
            (arc - seg_start) / seg_len
        } else {
            0.0
        };

        (seg_idx, local_t)
    }

    /// Closest point to `point` on a single segment.
    ///
    /// Returns `None` if `segment` is out of range.
    #[must_use]
    pub fn project_onto_segment(
        &self,
        segment: usize,
        point: &Point3<f64>,
    ) -> Option<PolylineProjection> {
        let (a, b) = self.segment(segment)?;
        let d = b - a;
        let len_sq = d.norm_squared();
        let local_t = if len_sq > 1e-20 {
            ((point - a).dot(&d) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = a + d * local_t;
        let seg_len = len_sq.sqrt();

        Some(PolylineProjection {
            point: closest,
            segment,
            local_t,
            arc: local_t.mul_add(seg_len, self.cumulative_lengths[segment]),
            distance: (point - closest).norm(),
        })
    }

    /// Exact closest point on the whole polyline.
    ///
    /// Checks every segment; ties resolve to the lowest segment index.
    ///
    /// # Example
    ///
    /// ```
    /// use curve_types::Polyline;
    /// use nalgebra::Point3;
    ///
    /// let line = Polyline::try_new(vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(10.0, 0.0, 0.0),
    /// ]).unwrap();
    /// let proj = line.project(&Point3::new(4.0, 3.0, 0.0));
    /// assert!((proj.distance - 3.0).abs() < 1e-12);
    /// assert!((proj.arc - 4.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> PolylineProjection {
        let mut best = self.vertex_projection(0, point);
        for segment in 0..self.num_segments() {
            if let Some(candidate) = self.project_onto_segment(segment, point) {
                if candidate.distance < best.distance {
                    best = candidate;
                }
            }
        }
        best
    }

    fn vertex_projection(&self, index: usize, point: &Point3<f64>) -> PolylineProjection {
        let vertex = self.vertices[index];
        PolylineProjection {
            point: vertex,
            segment: index.min(self.num_segments() - 1),
            local_t: 0.0,
            arc: self.cumulative_lengths[index],
            distance: (point - vertex).norm(),
        }
    }

    /// Resample to `n` vertices with uniform arc length spacing.
    #[must_use]
    pub fn resampled(&self, n: usize) -> Self {
        Self::from_valid(self.sample_arc_length(n.max(2)))
    }

    /// Resample so consecutive vertices are at most `spacing` apart.
    ///
    /// Endpoints are kept. A non-positive spacing returns a clone.
    #[must_use]
    pub fn resampled_by_spacing(&self, spacing: f64) -> Self {
        if spacing <= 0.0 || !spacing.is_finite() {
            return self.clone();
        }
        // Absorb rounding in the accumulated length so exact multiples of
        // the spacing do not gain an extra vertex
        let spans = (self.total_length / spacing - 1e-9).ceil().max(1.0);
        self.resampled(spans as usize + 1)
    }
}

impl Curve for Polyline {
    fn point_at(&self, t: f64) -> Point3<f64> {
        let arc = t.clamp(0.0, 1.0) * self.total_length;
        let (seg_idx, local_t) = self.segment_at_arc(arc);

        let p0 = self.vertices[seg_idx];
        let p1 = self.vertices[seg_idx + 1];

        p0 + (p1 - p0) * local_t
    }

    fn tangent_at(&self, t: f64) -> Vector3<f64> {
        let arc = t.clamp(0.0, 1.0) * self.total_length;
        let (seg_idx, _) = self.segment_at_arc(arc);

        // Degenerate segments borrow the nearest non-degenerate direction
        (seg_idx..self.num_segments())
            .chain((0..seg_idx).rev())
            .find_map(|i| self.segment_direction(i))
            .unwrap_or_else(Vector3::x)
    }

    fn derivative_at(&self, t: f64) -> Vector3<f64> {
        self.tangent_at(t) * self.total_length
    }

    fn arc_length(&self) -> f64 {
        self.total_length
    }

    fn arc_length_between(&self, t0: f64, t1: f64) -> f64 {
        (t1.clamp(0.0, 1.0) - t0.clamp(0.0, 1.0)).abs() * self.total_length
    }

    fn arc_to_t(&self, s: f64) -> f64 {
        if self.total_length <= 0.0 {
            return 0.0;
        }
        (s / self.total_length).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn l_shape() -> Polyline {
        Polyline::try_new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 3.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_try_new_rejects_short_and_nan() {
        assert!(matches!(
            Polyline::try_new(vec![Point3::origin()]),
            Err(CurveError::InsufficientPoints { required: 2, actual: 1 })
        ));
        assert!(matches!(
            Polyline::try_new(vec![Point3::origin(), Point3::new(f64::NAN, 0.0, 0.0)]),
            Err(CurveError::NonFinite { index: 1 })
        ));
    }

    #[test]
    fn test_cumulative_lengths() {
        let p = l_shape();
        assert_relative_eq!(p.arc_length(), 7.0);
        assert_relative_eq!(p.arc_at_vertex(1).unwrap(), 4.0);
        assert_eq!(p.arc_at_vertex(3), None);
        assert_eq!(p.num_segments(), 2);
    }

    #[test]
    fn test_point_at_second_segment() {
        let p = l_shape();
        let q = p.point_at(5.5 / 7.0);
        assert_relative_eq!(q.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(q.y, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_project_interior_and_clamped() {
        let p = l_shape();

        let inner = p.project(&Point3::new(2.0, -1.0, 0.0));
        assert_eq!(inner.segment, 0);
        assert_relative_eq!(inner.distance, 1.0, epsilon = 1e-12);
        assert_relative_eq!(inner.arc, 2.0, epsilon = 1e-12);

        let second = p.project(&Point3::new(6.0, 2.0, 1.0));
        assert_eq!(second.segment, 1);
        assert_relative_eq!(second.arc, 6.0, epsilon = 1e-12);
        assert_relative_eq!(second.distance, 5.0_f64.sqrt(), epsilon = 1e-12);

        let before = p.project(&Point3::new(-3.0, 4.0, 0.0));
        assert_relative_eq!(before.arc, 0.0);
        assert_relative_eq!(before.distance, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_matches_brute_force_samples() {
        let p = l_shape();
        let q = Point3::new(3.0, 1.0, 2.0);
        let proj = p.project(&q);
        let brute = p
            .sample_arc_length(7001)
            .iter()
            .map(|s| (q - s).norm())
            .fold(f64::INFINITY, f64::min);
        assert!(proj.distance <= brute + 1e-12);
        assert_relative_eq!(proj.distance, brute, epsilon = 1e-3);
    }

    #[test]
    fn test_degenerate_polyline() {
        let p = Polyline::try_new(vec![Point3::new(1.0, 1.0, 1.0); 3]).unwrap();
        assert_relative_eq!(p.arc_length(), 0.0);
        let proj = p.project(&Point3::new(1.0, 1.0, 4.0));
        assert_relative_eq!(proj.distance, 3.0);
        assert_relative_eq!(p.tangent_at(0.5).norm(), 1.0);
    }

    #[test]
    fn test_resampled_by_spacing() {
        let p = l_shape().resampled_by_spacing(1.0);
        assert_eq!(p.len(), 8);
        for pair in p.vertices().windows(2) {
            assert_relative_eq!((pair[1] - pair[0]).norm(), 1.0, epsilon = 1e-9);
        }
        assert_eq!(l_shape().resampled_by_spacing(0.0), l_shape());
    }

    #[test]
    fn test_tangent_skips_zero_length_segment() {
        let p = Polyline::try_new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ])
        .unwrap();
        let t = p.tangent_at(0.0);
        assert_relative_eq!(t.y, 1.0, epsilon = 1e-12);
        assert!(p.segment_direction(0).is_none());
    }
}
