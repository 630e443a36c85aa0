//! Curve framing and parallel transport.
//!
//! Rotation-minimizing frames give every point along a centerline a stable
//! angular reference, so "angle around the axis" means the same thing from
//! one end of a bent tube to the other.

use crate::{Curve, Polyline};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A coordinate frame at a point on a curve.
///
/// The frame consists of three mutually orthonormal vectors:
/// - `tangent`: Points along the curve in the direction of increasing `t`
/// - `normal`: Perpendicular to tangent; the zero-angle reference
/// - `binormal`: Completes the right-handed coordinate system (`tangent × normal`)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Position on the curve.
    pub position: Point3<f64>,
    /// Unit tangent vector (forward direction).
    pub tangent: Vector3<f64>,
    /// Unit normal vector (perpendicular to tangent).
    pub normal: Vector3<f64>,
    /// Unit binormal vector (`tangent × normal`).
    pub binormal: Vector3<f64>,
    /// Parameter value `t` where this frame was computed.
    pub t: f64,
}

impl Frame {
    /// Create a new frame with the given components.
    ///
    /// The vectors are assumed to be orthonormal.
    #[must_use]
    pub fn new(
        position: Point3<f64>,
        tangent: Vector3<f64>,
        normal: Vector3<f64>,
        binormal: Vector3<f64>,
        t: f64,
    ) -> Self {
        Self {
            position,
            tangent,
            normal,
            binormal,
            t,
        }
    }

    /// Create a frame from a tangent vector and an "up" hint.
    ///
    /// The normal is the component of `up` orthogonal to the tangent. If
    /// the two are parallel an arbitrary perpendicular is used.
    #[must_use]
    pub fn from_tangent_and_up(
        position: Point3<f64>,
        tangent: Vector3<f64>,
        up: Vector3<f64>,
        t: f64,
    ) -> Self {
        let tangent = tangent.try_normalize(1e-12).unwrap_or_else(Vector3::x);

        let binormal = tangent.cross(&up);
        let binormal_norm = binormal.norm();

        let (normal, binormal) = if binormal_norm > 1e-10 {
            let binormal = binormal / binormal_norm;
            (binormal.cross(&tangent), binormal)
        } else {
            let perp = if tangent.x.abs() < 0.9 {
                Vector3::x()
            } else {
                Vector3::y()
            };
            let binormal = tangent.cross(&perp).normalize();
            (binormal.cross(&tangent), binormal)
        };

        Self {
            position,
            tangent,
            normal,
            binormal,
            t,
        }
    }

    /// Angle of `offset` around the tangent, measured from the normal.
    ///
    /// The result is in `[0, 2π)`. Offsets along the tangent have no
    /// defined angle and map to `0`.
    ///
    /// # Example
    ///
    /// ```
    /// use curve_types::Frame;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let f = Frame::new(Point3::origin(), Vector3::z(), Vector3::x(), Vector3::y(), 0.0);
    /// let a = f.angle_around(&Vector3::new(0.0, -2.0, 0.0));
    /// assert!((a - 1.5 * std::f64::consts::PI).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn angle_around(&self, offset: &Vector3<f64>) -> f64 {
        let x = offset.dot(&self.normal);
        let y = offset.dot(&self.binormal);
        if x.hypot(y) < 1e-12 {
            return 0.0;
        }
        let angle = y.atan2(x);
        if angle < 0.0 {
            // atan2 can return exactly -0.0 or values whose sum rounds to 2π
            (angle + std::f64::consts::TAU) % std::f64::consts::TAU
        } else {
            angle
        }
    }
}

/// One rotation-minimizing frame per polyline segment.
///
/// Frames are carried from segment to segment with the double reflection
/// method of Wang et al. (2008). Frame `i` sits at vertex `i` with its
/// tangent along segment `i`; its `t` field holds the arc length at that
/// vertex. Zero-length segments inherit the previous direction.
///
/// # Example
///
/// ```
/// use curve_types::{Polyline, polyline_segment_frames};
/// use nalgebra::Point3;
///
/// let curve = Polyline::try_new(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(2.0, 1.0, 0.0),
/// ]).unwrap();
///
/// let frames = polyline_segment_frames(&curve);
/// assert_eq!(frames.len(), 2);
/// assert!(frames[1].normal.dot(&frames[1].tangent).abs() < 1e-12);
/// ```
#[must_use]
pub fn polyline_segment_frames(polyline: &Polyline) -> Vec<Frame> {
    let segments = polyline.num_segments();
    let mut frames: Vec<Frame> = Vec::with_capacity(segments);
    let vertices = polyline.vertices();

    let first_dir = polyline.tangent_at(0.0);
    frames.push(initial_frame(vertices[0], first_dir, 0.0));

    for i in 1..segments {
        let prev = frames[i - 1];
        let tangent = polyline.segment_direction(i).unwrap_or(prev.tangent);
        let arc = polyline.arc_at_vertex(i).unwrap_or(prev.t);
        frames.push(transport_frame(&prev, vertices[i], tangent, arc));
    }

    frames
}

fn initial_frame(position: Point3<f64>, tangent: Vector3<f64>, t: f64) -> Frame {
    let up = if tangent.z.abs() < 0.9 {
        Vector3::z()
    } else {
        Vector3::y()
    };
    Frame::from_tangent_and_up(position, tangent, up, t)
}

/// Transport a frame to a new position and tangent using double reflection.
fn transport_frame(prev: &Frame, position: Point3<f64>, tangent: Vector3<f64>, t: f64) -> Frame {
    let tangent = tangent.try_normalize(1e-12).unwrap_or(prev.tangent);

    let v1 = position - prev.position;
    let c1 = v1.dot(&v1);

    if c1 < 1e-20 {
        // Coincident points: rotate the previous normal onto the new tangent
        let binormal = tangent.cross(&prev.normal);
        let binormal_norm = binormal.norm();

        let (normal, binormal) = if binormal_norm > 1e-10 {
            let binormal = binormal / binormal_norm;
            (binormal.cross(&tangent), binormal)
        } else {
            (prev.normal, prev.binormal)
        };

        return Frame::new(position, tangent, normal, binormal, t);
    }

    // First reflection across the plane perpendicular to v1
    let r_l = prev.normal - v1 * (2.0 / c1) * v1.dot(&prev.normal);
    let t_l = prev.tangent - v1 * (2.0 / c1) * v1.dot(&prev.tangent);

    // Second reflection
    let v2 = tangent - t_l;
    let c2 = v2.dot(&v2);

    let normal = if c2 < 1e-20 {
        r_l.normalize()
    } else {
        (r_l - v2 * (2.0 / c2) * v2.dot(&r_l)).normalize()
    };

    let binormal = tangent.cross(&normal);

    Frame::new(position, tangent, normal, binormal, t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn is_orthonormal(f: &Frame, tolerance: f64) -> bool {
        let lengths_ok = [f.tangent, f.normal, f.binormal]
            .iter()
            .all(|v| (v.norm() - 1.0).abs() < tolerance);

        lengths_ok
            && f.tangent.dot(&f.normal).abs() < tolerance
            && f.tangent.dot(&f.binormal).abs() < tolerance
            && f.normal.dot(&f.binormal).abs() < tolerance
    }

    #[test]
    fn test_from_tangent_and_up() {
        let f = Frame::from_tangent_and_up(Point3::origin(), Vector3::x(), Vector3::z(), 0.0);
        assert!(is_orthonormal(&f, 1e-12));
        assert_relative_eq!(f.normal, Vector3::z(), epsilon = 1e-12);

        let parallel = Frame::from_tangent_and_up(Point3::origin(), Vector3::z(), Vector3::z(), 0.0);
        assert!(is_orthonormal(&parallel, 1e-12));
    }

    #[test]
    fn test_angle_around_quadrants() {
        let f = Frame::new(Point3::origin(), Vector3::z(), Vector3::x(), Vector3::y(), 0.0);
        assert_relative_eq!(f.angle_around(&Vector3::new(1.0, 0.0, 5.0)), 0.0);
        assert_relative_eq!(f.angle_around(&Vector3::new(0.0, 1.0, 0.0)), FRAC_PI_2);
        assert_relative_eq!(f.angle_around(&Vector3::new(-1.0, 0.0, 0.0)), PI);
        assert_relative_eq!(f.angle_around(&Vector3::new(0.0, 0.0, 3.0)), 0.0);
        let a = f.angle_around(&Vector3::new(1.0, -1e-17, 0.0));
        assert!((0.0..std::f64::consts::TAU).contains(&a));
    }

    #[test]
    fn test_transport_straight_line_keeps_normal() {
        let line = Polyline::try_new(
            (0..5).map(|i| Point3::new(0.0, 0.0, f64::from(i))).collect(),
        )
        .unwrap();
        let frames = polyline_segment_frames(&line);
        assert_eq!(frames.len(), 4);
        for f in &frames {
            assert!(is_orthonormal(f, 1e-10));
            assert_relative_eq!(f.normal, frames[0].normal, epsilon = 1e-12);
        }
        assert_relative_eq!(frames[3].t, 3.0);
    }

    #[test]
    fn test_transport_through_bend_stays_orthonormal() {
        let bent = Polyline::try_new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(2.0, 3.0, 2.0),
        ])
        .unwrap();
        let frames = polyline_segment_frames(&bent);
        assert_eq!(frames.len(), 5);
        for (i, f) in frames.iter().enumerate() {
            assert!(is_orthonormal(f, 1e-9), "frame {i} not orthonormal");
        }
    }
}
