//! Piecewise-linear color gradients for per-face value maps.

// Gradient positions are fractions in [0, 1].
#![allow(clippy::cast_possible_truncation)]

use mesh_types::FaceColor;

use crate::error::{SegmentError, SegmentResult};

/// JET stops: blue, cyan, green, yellow, red.
const JET: [(f64, [f32; 3]); 5] = [
    (0.0, [0.0, 0.0, 1.0]),
    (0.25, [0.0, 1.0, 1.0]),
    (0.5, [0.0, 1.0, 0.0]),
    (0.75, [1.0, 1.0, 0.0]),
    (1.0, [1.0, 0.0, 0.0]),
];

/// Maps scalar values in `[min, max]` to colors.
///
/// Stops are `(position, rgb)` pairs with positions ascending from 0 to 1.
/// Values outside the range clamp to the end colors; NaN maps to the first.
///
/// # Example
///
/// ```
/// use mesh_defect::GradientColorMap;
/// use mesh_types::FaceColor;
///
/// let map = GradientColorMap::jet(0.0, 10.0).unwrap();
/// assert_eq!(map.color(-3.0), FaceColor::BLUE);
/// assert_eq!(map.color(5.0), FaceColor::GREEN);
/// assert_eq!(map.color(42.0), FaceColor::RED);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GradientColorMap {
    min: f64,
    max: f64,
    stops: Vec<(f64, [f32; 3])>,
}

impl GradientColorMap {
    /// Create a gradient over `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::InvalidColorMap`] if the range is empty or not
    /// finite, there are fewer than two stops, or the stop positions do not
    /// run from 0 to 1 in ascending order.
    pub fn new(min: f64, max: f64, stops: Vec<(f64, [f32; 3])>) -> SegmentResult<Self> {
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(SegmentError::invalid_color_map(format!(
                "range must satisfy min < max, got [{min}, {max}]"
            )));
        }
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return Err(SegmentError::invalid_color_map("need at least two stops"));
        };
        if stops.len() < 2 {
            return Err(SegmentError::invalid_color_map("need at least two stops"));
        }
        if first.0.abs() > f64::EPSILON || (last.0 - 1.0).abs() > f64::EPSILON {
            return Err(SegmentError::invalid_color_map(
                "stop positions must start at 0 and end at 1",
            ));
        }
        if stops.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(SegmentError::invalid_color_map("stops out of order"));
        }
        Ok(Self { min, max, stops })
    }

    /// The JET map: blue, cyan, green, yellow, red.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::InvalidColorMap`] for an empty or non-finite
    /// range.
    pub fn jet(min: f64, max: f64) -> SegmentResult<Self> {
        Self::new(min, max, JET.to_vec())
    }

    /// Value range covered by the gradient.
    #[must_use]
    pub const fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Color for `value`, as an opaque [`FaceColor`].
    #[must_use]
    pub fn color(&self, value: f64) -> FaceColor {
        let t = if value.is_nan() {
            0.0
        } else {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        };

        let upper = self
            .stops
            .iter()
            .position(|s| s.0 >= t)
            .unwrap_or(self.stops.len() - 1)
            .max(1);
        let (t0, c0) = self.stops[upper - 1];
        let (t1, c1) = self.stops[upper];
        let f = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0) as f32;
        let lerp = |i: usize| (c1[i] - c0[i]).mul_add(f, c0[i]);
        FaceColor::from_float(lerp(0), lerp(1), lerp(2), 1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_stops() {
        let map = GradientColorMap::jet(0.0, 10.0).unwrap();
        assert_eq!(map.color(0.0), FaceColor::BLUE);
        assert_eq!(map.color(2.5), FaceColor::new(0, 255, 255));
        assert_eq!(map.color(5.0), FaceColor::GREEN);
        assert_eq!(map.color(7.5), FaceColor::new(255, 255, 0));
        assert_eq!(map.color(10.0), FaceColor::RED);
    }

    #[test]
    fn test_interpolates_between_stops() {
        let map = GradientColorMap::jet(0.0, 1.0).unwrap();
        let c = map.color(0.125);
        assert_eq!((c.r, c.g, c.b), (0, 128, 255));
    }

    #[test]
    fn test_clamps_out_of_range() {
        let map = GradientColorMap::jet(2.0, 4.0).unwrap();
        assert_eq!(map.color(-100.0), FaceColor::BLUE);
        assert_eq!(map.color(100.0), FaceColor::RED);
        assert_eq!(map.color(f64::NAN), FaceColor::BLUE);
        assert_eq!(map.range(), (2.0, 4.0));
    }

    #[test]
    fn test_invalid_maps() {
        assert!(GradientColorMap::jet(1.0, 1.0).is_err());
        assert!(GradientColorMap::jet(f64::NAN, 1.0).is_err());
        assert!(GradientColorMap::new(0.0, 1.0, vec![(0.0, [0.0; 3])]).is_err());
        assert!(GradientColorMap::new(0.0, 1.0, vec![]).is_err());
        assert!(
            GradientColorMap::new(0.0, 1.0, vec![(0.0, [0.0; 3]), (0.5, [1.0; 3])]).is_err()
        );
        assert!(
            GradientColorMap::new(
                0.0,
                1.0,
                vec![(0.0, [0.0; 3]), (0.6, [0.5; 3]), (0.4, [0.5; 3]), (1.0, [1.0; 3])]
            )
            .is_err()
        );
    }

    #[test]
    fn test_two_stop_gray() {
        let map = GradientColorMap::new(0.0, 1.0, vec![(0.0, [0.0; 3]), (1.0, [1.0; 3])]).unwrap();
        assert_eq!(map.color(0.5), FaceColor::new(128, 128, 128));
    }
}
