//! Voxel coordinate types.

use nalgebra::Point3;

/// A discrete 3D coordinate in grid space.
///
/// Uses `i32` coordinates so cells on both sides of the world origin are
/// addressable.
///
/// # Example
///
/// ```
/// use cf_spatial::VoxelCoord;
/// use nalgebra::Point3;
///
/// let coord = VoxelCoord::new(-1, 2, 3);
/// assert_eq!(coord.to_point(), Point3::new(-1.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl VoxelCoord {
    /// Creates a new voxel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Converts to a floating-point point.
    #[must_use]
    pub fn to_point(self) -> Point3<f64> {
        Point3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_point_is_exact_at_extremes() {
        let p = VoxelCoord::new(i32::MIN, 0, i32::MAX).to_point();
        assert_eq!(p.x, f64::from(i32::MIN));
        assert_eq!(p.z, f64::from(i32::MAX));
    }
}
