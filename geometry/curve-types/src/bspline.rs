//! B-spline curves.
//!
//! Clamped B-splines are the smoothing model for raw centerlines: the curve
//! starts and ends on the first and last control points, and each control
//! point only bends a local stretch of the curve.

use crate::{Curve, CurveError, Result};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A B-spline curve of arbitrary degree.
///
/// # Knot Vector
///
/// The knot vector must be non-decreasing and have length `n + p + 1`, where
/// `n` is the number of control points and `p` is the degree.
///
/// # Example
///
/// ```
/// use curve_types::{BSpline, Curve};
/// use nalgebra::Point3;
///
/// let control_points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
///     Point3::new(3.0, 2.0, 0.0),
///     Point3::new(4.0, 0.0, 0.0),
///     Point3::new(5.0, -1.0, 0.0),
/// ];
///
/// let spline = BSpline::clamped(control_points, 3).unwrap();
/// let end = spline.point_at(1.0);
/// assert!((end.x - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BSpline {
    control_points: Vec<Point3<f64>>,
    knots: Vec<f64>,
    degree: usize,
}

impl BSpline {
    /// Create a B-spline with explicit knot vector.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Fewer than `degree + 1` control points
    /// - Knot vector has incorrect length
    /// - Knot vector is not non-decreasing
    pub fn new(control_points: Vec<Point3<f64>>, knots: Vec<f64>, degree: usize) -> Result<Self> {
        let n = control_points.len();

        if n < degree + 1 {
            return Err(CurveError::insufficient_points(degree + 1, n));
        }

        let expected_knots = n + degree + 1;
        if knots.len() != expected_knots {
            return Err(CurveError::invalid_knot_vector(format!(
                "expected {expected_knots} knots for {n} control points and degree {degree}, got {}",
                knots.len()
            )));
        }

        if let Some(i) = (1..knots.len()).find(|&i| knots[i] < knots[i - 1]) {
            return Err(CurveError::invalid_knot_vector(format!(
                "knot vector is not non-decreasing at index {i}"
            )));
        }

        Ok(Self {
            control_points,
            knots,
            degree,
        })
    }

    /// Create a clamped (open) B-spline with uniform interior knots.
    ///
    /// Clamped B-splines pass through their first and last control points.
    ///
    /// # Errors
    ///
    /// Returns error if fewer than `degree + 1` control points.
    pub fn clamped(control_points: Vec<Point3<f64>>, degree: usize) -> Result<Self> {
        let n = control_points.len();

        if n < degree + 1 {
            return Err(CurveError::insufficient_points(degree + 1, n));
        }

        let num_interior = n - degree - 1;
        let mut knots = Vec::with_capacity(n + degree + 1);
        knots.extend(std::iter::repeat_n(0.0, degree + 1));
        knots.extend((1..=num_interior).map(|i| i as f64 / (num_interior + 1) as f64));
        knots.extend(std::iter::repeat_n(1.0, degree + 1));

        Self::new(control_points, knots, degree)
    }

    /// Get the control points.
    #[must_use]
    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.control_points
    }

    /// Get the knot vector.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Get the degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Get the valid parameter domain `[u_min, u_max]`.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        let p = self.degree;
        (self.knots[p], self.knots[self.knots.len() - p - 1])
    }

    /// The derivative curve: a B-spline of one degree lower.
    ///
    /// Returns `None` for degree 0.
    #[must_use]
    pub fn hodograph(&self) -> Option<Self> {
        let p = self.degree;
        if p == 0 {
            return None;
        }

        let control_points = (0..self.control_points.len() - 1)
            .map(|i| {
                let span = self.knots[i + p + 1] - self.knots[i + 1];
                let scale = if span > 1e-15 { p as f64 / span } else { 0.0 };
                Point3::from((self.control_points[i + 1] - self.control_points[i]) * scale)
            })
            .collect();
        let knots = self.knots[1..self.knots.len() - 1].to_vec();

        Some(Self {
            control_points,
            knots,
            degree: p - 1,
        })
    }

    /// Find the knot span index `i` with `knots[i] <= u < knots[i+1]`.
    fn find_span(&self, u: f64) -> usize {
        let n = self.control_points.len();
        let p = self.degree;

        if u >= self.knots[n] {
            return n - 1;
        }
        if u <= self.knots[p] {
            return p;
        }

        let mut low = p;
        let mut high = n;
        while low < high {
            let mid = (low + high) / 2;
            if self.knots[mid] > u {
                high = mid;
            } else {
                low = mid + 1;
            }
        }

        low - 1
    }

    /// The `degree + 1` non-zero basis functions at `u` (Cox-de Boor).
    fn basis_functions(&self, span: usize, u: f64) -> Vec<f64> {
        let p = self.degree;
        let mut n_basis = vec![0.0; p + 1];
        let mut left = vec![0.0; p + 1];
        let mut right = vec![0.0; p + 1];

        n_basis[0] = 1.0;

        for j in 1..=p {
            left[j] = u - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - u;

            let mut saved = 0.0;
            for r in 0..j {
                let denom = right[r + 1] + left[j - r];
                if denom.abs() > 1e-15 {
                    let temp = n_basis[r] / denom;
                    n_basis[r] = saved + right[r + 1] * temp;
                    saved = left[j - r] * temp;
                } else {
                    n_basis[r] = saved;
                    saved = 0.0;
                }
            }
            n_basis[j] = saved;
        }

        n_basis
    }

    /// Evaluate at a raw knot-space parameter.
    fn eval(&self, u: f64) -> Point3<f64> {
        let span = self.find_span(u);
        let basis = self.basis_functions(span, u);

        let mut point = Vector3::zeros();
        for (i, weight) in basis.iter().enumerate() {
            point += self.control_points[span - self.degree + i].coords * *weight;
        }

        Point3::from(point)
    }

    /// Map `t ∈ [0, 1]` onto the knot domain.
    fn normalize_param(&self, t: f64) -> f64 {
        let (u_min, u_max) = self.domain();
        u_min + t.clamp(0.0, 1.0) * (u_max - u_min)
    }
}

impl Curve for BSpline {
    fn point_at(&self, t: f64) -> Point3<f64> {
        self.eval(self.normalize_param(t))
    }

    fn tangent_at(&self, t: f64) -> Vector3<f64> {
        self.derivative_at(t)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::x)
    }

    fn derivative_at(&self, t: f64) -> Vector3<f64> {
        let (u_min, u_max) = self.domain();
        let u = self.normalize_param(t);
        self.hodograph()
            .map_or_else(Vector3::zeros, |d| d.eval(u).coords * (u_max - u_min))
    }
}
