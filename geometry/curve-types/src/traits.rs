//! Core curve traits.

use nalgebra::{Point3, Vector3};

/// A parametric curve in 3D space.
///
/// All curves are parameterized over `t ∈ [0, 1]`, where `t=0` is the start
/// and `t=1` is the end of the curve.
///
/// # Implementors
///
/// - [`Polyline`](crate::Polyline) - Piecewise linear
/// - [`BSpline`](crate::BSpline) - B-spline curves
pub trait Curve {
    /// Evaluate the curve position at parameter `t`.
    ///
    /// Implementations clamp `t` to `[0, 1]`.
    fn point_at(&self, t: f64) -> Point3<f64>;

    /// Compute the unit tangent vector at parameter `t`.
    ///
    /// The tangent points in the direction of increasing `t`.
    fn tangent_at(&self, t: f64) -> Vector3<f64>;

    /// Compute the first derivative (velocity) at parameter `t`.
    fn derivative_at(&self, t: f64) -> Vector3<f64>;

    /// Compute the total arc length of the curve.
    fn arc_length(&self) -> f64 {
        self.arc_length_between(0.0, 1.0)
    }

    /// Compute the arc length between two parameter values.
    ///
    /// Integrates the speed with adaptive Simpson quadrature. Always
    /// non-negative.
    fn arc_length_between(&self, t0: f64, t1: f64) -> f64 {
        let (start, end) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        adaptive_arc_length(self, start, end, 1e-10, 20)
    }

    /// Convert an arc length to a parameter value.
    ///
    /// Clamps to `[0, 1]` if `s` is outside `[0, arc_length]`.
    fn arc_to_t(&self, s: f64) -> f64 {
        if s <= 0.0 {
            return 0.0;
        }

        let total = self.arc_length();
        if s >= total {
            return 1.0;
        }

        let mut lo = 0.0;
        let mut hi = 1.0;
        for _ in 0..50 {
            let mid = (lo + hi) / 2.0;
            let arc = self.arc_length_between(0.0, mid);
            if (arc - s).abs() < 1e-10 {
                return mid;
            }
            if arc < s {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        (lo + hi) / 2.0
    }

    /// Sample the curve at `n` uniform parameter intervals (`n >= 2`).
    fn sample_uniform(&self, n: usize) -> Vec<Point3<f64>> {
        let n = n.max(2);
        (0..n)
            .map(|i| self.point_at(i as f64 / (n - 1) as f64))
            .collect()
    }

    /// Sample the curve at `n` uniform arc-length intervals (`n >= 2`).
    fn sample_arc_length(&self, n: usize) -> Vec<Point3<f64>> {
        let n = n.max(2);
        let total = self.arc_length();

        (0..n)
            .map(|i| {
                let s = i as f64 / (n - 1) as f64 * total;
                self.point_at(self.arc_to_t(s))
            })
            .collect()
    }
}

/// Adaptive Simpson's rule for arc length integration.
fn adaptive_arc_length<C: Curve + ?Sized>(
    curve: &C,
    a: f64,
    b: f64,
    tolerance: f64,
    max_depth: usize,
) -> f64 {
    fn simpson_step<C: Curve + ?Sized>(curve: &C, a: f64, b: f64) -> f64 {
        let mid = (a + b) / 2.0;
        let h = (b - a) / 6.0;

        let fa = curve.derivative_at(a).norm();
        let fm = curve.derivative_at(mid).norm();
        let fb = curve.derivative_at(b).norm();

        h * (fa + 4.0 * fm + fb)
    }

    fn adaptive_helper<C: Curve + ?Sized>(
        curve: &C,
        a: f64,
        b: f64,
        tolerance: f64,
        whole: f64,
        depth: usize,
    ) -> f64 {
        let mid = (a + b) / 2.0;
        let left = simpson_step(curve, a, mid);
        let right = simpson_step(curve, mid, b);
        let combined = left + right;

        if depth == 0 || (combined - whole).abs() < 15.0 * tolerance {
            combined + (combined - whole) / 15.0
        } else {
            let new_tol = tolerance / 2.0;
            adaptive_helper(curve, a, mid, new_tol, left, depth - 1)
                + adaptive_helper(curve, mid, b, new_tol, right, depth - 1)
        }
    }

    let whole = simpson_step(curve, a, b);
    adaptive_helper(curve, a, b, tolerance, whole, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Quarter circle of radius 2 in the XY plane, parameterized by angle.
    struct QuarterCircle;

    impl Curve for QuarterCircle {
        fn point_at(&self, t: f64) -> Point3<f64> {
            let a = t.clamp(0.0, 1.0) * std::f64::consts::FRAC_PI_2;
            Point3::new(2.0 * a.cos(), 2.0 * a.sin(), 0.0)
        }

        fn tangent_at(&self, t: f64) -> Vector3<f64> {
            self.derivative_at(t).normalize()
        }

        fn derivative_at(&self, t: f64) -> Vector3<f64> {
            let a = t.clamp(0.0, 1.0) * std::f64::consts::FRAC_PI_2;
            Vector3::new(-a.sin(), a.cos(), 0.0) * std::f64::consts::PI
        }
    }

    #[test]
    fn test_quadrature_arc_length() {
        assert_relative_eq!(QuarterCircle.arc_length(), std::f64::consts::PI, epsilon = 1e-8);
    }

    #[test]
    fn test_arc_to_t_midpoint() {
        let t = QuarterCircle.arc_to_t(std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(t, 0.5, epsilon = 1e-6);
        assert_relative_eq!(QuarterCircle.arc_to_t(-1.0), 0.0);
        assert_relative_eq!(QuarterCircle.arc_to_t(100.0), 1.0);
    }

    #[test]
    fn test_sampling_counts_and_endpoints() {
        let samples = QuarterCircle.sample_arc_length(5);
        assert_eq!(samples.len(), 5);
        assert_relative_eq!(samples[0].x, 2.0, epsilon = 1e-10);
        assert_relative_eq!(samples[4].y, 2.0, epsilon = 1e-10);
        assert_eq!(QuarterCircle.sample_uniform(1).len(), 2);
    }
}
