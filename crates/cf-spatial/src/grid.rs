//! Sparse voxel grid and integer bounds.

use hashbrown::HashMap;

use nalgebra::Point3;

use crate::error::SpatialError;
use crate::voxel::VoxelCoord;

/// Axis-aligned bounds in integer space.
///
/// Both corners are inclusive. Besides describing a block of grid cells,
/// a `GridBounds` is the integer domain a smoothed centerline must stay in.
///
/// # Example
///
/// ```
/// use cf_spatial::{GridBounds, VoxelCoord};
///
/// let bounds = GridBounds::new(
///     VoxelCoord::new(10, 0, 10),
///     VoxelCoord::new(0, 10, 0),
/// );
/// assert_eq!(bounds.min, VoxelCoord::new(0, 0, 0));
/// assert_eq!(bounds.max, VoxelCoord::new(10, 10, 10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    /// Minimum corner (inclusive).
    pub min: VoxelCoord,
    /// Maximum corner (inclusive).
    pub max: VoxelCoord,
}

impl GridBounds {
    /// Creates new bounds, ordering the corners so `min <= max` per axis.
    #[must_use]
    pub fn new(a: VoxelCoord, b: VoxelCoord) -> Self {
        Self {
            min: VoxelCoord::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: VoxelCoord::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest integer box enclosing a continuous box.
    ///
    /// The minimum corner is floored and the maximum corner is ceiled, so
    /// every point of the continuous box lies inside the result.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::CoordinateOutOfRange`] if a coordinate is not
    /// finite or does not fit in an `i32`.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_spatial::{GridBounds, VoxelCoord};
    /// use nalgebra::Point3;
    ///
    /// let b = GridBounds::enclosing(
    ///     &Point3::new(-1.5, 0.0, 2.2),
    ///     &Point3::new(3.1, 4.0, 9.9),
    /// ).unwrap();
    /// assert_eq!(b.min, VoxelCoord::new(-2, 0, 2));
    /// assert_eq!(b.max, VoxelCoord::new(4, 4, 10));
    /// ```
    pub fn enclosing(min: &Point3<f64>, max: &Point3<f64>) -> Result<Self, SpatialError> {
        let lo = VoxelCoord::new(
            to_cell(min.x.floor())?,
            to_cell(min.y.floor())?,
            to_cell(min.z.floor())?,
        );
        let hi = VoxelCoord::new(
            to_cell(max.x.ceil())?,
            to_cell(max.y.ceil())?,
            to_cell(max.z.ceil())?,
        );
        Ok(Self::new(lo, hi))
    }

    /// Checks if a continuous point lies inside the closed box.
    #[must_use]
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        let lo = self.min.to_point();
        let hi = self.max.to_point();
        (lo.x..=hi.x).contains(&point.x)
            && (lo.y..=hi.y).contains(&point.y)
            && (lo.z..=hi.z).contains(&point.z)
    }

    /// Moves a point onto the nearest location inside the box.
    ///
    /// Points already inside are returned unchanged.
    #[must_use]
    pub fn clamp_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let lo = self.min.to_point();
        let hi = self.max.to_point();
        Point3::new(
            point.x.clamp(lo.x, hi.x),
            point.y.clamp(lo.y, hi.y),
            point.z.clamp(lo.z, hi.z),
        )
    }

    /// Every cell of the box, X varying fastest.
    fn cells(self) -> impl Iterator<Item = VoxelCoord> {
        let (lo, hi) = (self.min, self.max);
        (lo.z..=hi.z).flat_map(move |z| {
            (lo.y..=hi.y).flat_map(move |y| (lo.x..=hi.x).map(move |x| VoxelCoord::new(x, y, z)))
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_cell(value: f64) -> Result<i32, SpatialError> {
    if value.is_finite() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        // In range and already integral after floor/ceil
        Ok(value as i32)
    } else {
        Err(SpatialError::CoordinateOutOfRange { value })
    }
}

/// A sparse 3D grid storing values of type `T` per cell.
///
/// Only occupied cells consume memory. The tracker stores face ids per
/// cell for neighborhood lookups and step indices per cell for its cycle
/// guard. Cell `(i, j, k)` covers `[i·s, (i+1)·s)` on each axis.
///
/// # Example
///
/// ```
/// use cf_spatial::{VoxelGrid, VoxelCoord};
/// use nalgebra::Point3;
///
/// let mut grid: VoxelGrid<usize> = VoxelGrid::new(0.5);
/// let cell = grid.world_to_grid(Point3::new(0.7, -0.2, 1.0));
/// assert_eq!(cell, VoxelCoord::new(1, -1, 2));
///
/// grid.set(cell, 3);
/// assert_eq!(grid.get(cell), Some(&3));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelGrid<T> {
    inv_voxel_size: f64,
    data: HashMap<VoxelCoord, T>,
}

impl<T> VoxelGrid<T> {
    /// Creates a new empty grid with the given cell size.
    ///
    /// Non-positive sizes are coerced to a tiny positive value.
    #[must_use]
    pub fn new(voxel_size: f64) -> Self {
        Self {
            inv_voxel_size: 1.0 / voxel_size.abs().max(f64::EPSILON),
            data: HashMap::new(),
        }
    }

    /// Converts a world-space point to the cell containing it.
    ///
    /// Coordinates beyond the `i32` range saturate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn world_to_grid(&self, point: Point3<f64>) -> VoxelCoord {
        let cell = |v: f64| (v * self.inv_voxel_size).floor() as i32;
        VoxelCoord::new(cell(point.x), cell(point.y), cell(point.z))
    }

    /// Gets a reference to the value at a cell.
    #[must_use]
    pub fn get(&self, coord: VoxelCoord) -> Option<&T> {
        self.data.get(&coord)
    }

    /// Sets the value at a cell, returning the previous value if any.
    pub fn set(&mut self, coord: VoxelCoord, value: T) -> Option<T> {
        self.data.insert(coord, value)
    }

    /// Iterates over occupied cells that may hold content within `radius`
    /// of `center`.
    ///
    /// This walks the cube of cells covering the query sphere, so callers
    /// must still apply an exact distance test to the stored items.
    pub fn query_radius(
        &self,
        center: Point3<f64>,
        radius: f64,
    ) -> impl Iterator<Item = (VoxelCoord, &T)> {
        let r = radius.abs();
        let lo = self.world_to_grid(Point3::new(center.x - r, center.y - r, center.z - r));
        let hi = self.world_to_grid(Point3::new(center.x + r, center.y + r, center.z + r));
        GridBounds::new(lo, hi)
            .cells()
            .filter_map(move |coord| self.data.get(&coord).map(|value| (coord, value)))
    }
}

impl<T: Default> VoxelGrid<T> {
    /// Gets a mutable reference to a cell, inserting the default value first if empty.
    pub fn get_or_insert_default(&mut self, coord: VoxelCoord) -> &mut T {
        self.data.entry(coord).or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==================== GridBounds Tests ====================

    #[test]
    fn test_bounds_new_auto_order() {
        let bounds = GridBounds::new(VoxelCoord::new(10, 10, 10), VoxelCoord::new(0, 0, 0));
        assert_eq!(bounds.min, VoxelCoord::new(0, 0, 0));
        assert_eq!(bounds.max, VoxelCoord::new(10, 10, 10));
    }

    #[test]
    fn test_enclosing_floors_and_ceils() {
        let b = GridBounds::enclosing(&Point3::new(-0.1, 2.0, 3.5), &Point3::new(0.1, 2.0, 7.01))
            .unwrap();
        assert_eq!(b.min, VoxelCoord::new(-1, 2, 3));
        assert_eq!(b.max, VoxelCoord::new(1, 2, 8));
    }

    #[test]
    fn test_enclosing_rejects_non_finite() {
        let err = GridBounds::enclosing(&Point3::new(f64::NAN, 0.0, 0.0), &Point3::origin());
        assert!(matches!(err, Err(SpatialError::CoordinateOutOfRange { .. })));
        let err = GridBounds::enclosing(&Point3::origin(), &Point3::new(0.0, 1e12, 0.0));
        assert!(err.is_err());
    }

    #[test]
    fn test_clamp_point() {
        let b = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(10, 5, 5));
        let inside = Point3::new(2.5, 2.5, 2.5);
        assert_eq!(b.clamp_point(&inside), inside);
        let clamped = b.clamp_point(&Point3::new(-3.0, 9.0, 2.0));
        assert_relative_eq!(clamped.x, 0.0);
        assert_relative_eq!(clamped.y, 5.0);
        assert_relative_eq!(clamped.z, 2.0);
        assert!(b.contains_point(&clamped));
    }

    #[test]
    fn test_contains_point_is_closed() {
        let b = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 1, 1));
        assert!(b.contains_point(&Point3::new(1.0, 0.0, 1.0)));
        assert!(!b.contains_point(&Point3::new(1.0001, 0.0, 1.0)));
    }

    #[test]
    fn test_cells_cover_the_box_once() {
        let bounds = GridBounds::new(VoxelCoord::new(-1, 0, 0), VoxelCoord::new(1, 1, 1));
        let cells: Vec<VoxelCoord> = bounds.cells().collect();
        assert_eq!(cells.len(), 12);
        assert_eq!(cells[0], VoxelCoord::new(-1, 0, 0));
        assert_eq!(cells[1], VoxelCoord::new(0, 0, 0));
        assert_eq!(cells[11], VoxelCoord::new(1, 1, 1));
    }

    // ==================== VoxelGrid Tests ====================

    #[test]
    fn test_world_to_grid_floors() {
        let grid: VoxelGrid<u8> = VoxelGrid::new(2.0);
        assert_eq!(grid.world_to_grid(Point3::new(3.9, 0.0, -0.1)), VoxelCoord::new(1, 0, -1));
        assert_eq!(VoxelGrid::<u8>::new(0.0).world_to_grid(Point3::origin()), VoxelCoord::default());
    }

    #[test]
    fn test_query_radius_finds_nearby_cells_only() {
        let mut grid: VoxelGrid<Vec<u32>> = VoxelGrid::new(1.0);
        grid.get_or_insert_default(VoxelCoord::new(0, 0, 0)).push(1);
        grid.get_or_insert_default(VoxelCoord::new(1, 0, 0)).push(2);
        grid.get_or_insert_default(VoxelCoord::new(10, 0, 0)).push(3);

        let mut found: Vec<u32> = grid
            .query_radius(Point3::new(0.5, 0.5, 0.5), 1.0)
            .flat_map(|(_, v)| v.iter().copied())
            .collect();
        found.sort_unstable();
        assert_eq!(found, vec![1, 2]);
    }

    #[test]
    fn test_set_get_replace() {
        let mut grid: VoxelGrid<usize> = VoxelGrid::new(1.0);
        let c = VoxelCoord::new(1, 2, 3);
        assert_eq!(grid.get(c), None);
        assert_eq!(grid.set(c, 4), None);
        assert_eq!(grid.set(c, 9), Some(4));
        assert_eq!(grid.get(c), Some(&9));
    }
}
