//! Indexed polygon mesh.

use crate::{Aabb, FaceColor, MeshBounds, MeshError, MeshTopology, Polygon};
use nalgebra::Point3;
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A polygon face: vertex indices in winding order plus an optional color.
///
/// Triangles and quads are stored inline without a heap allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    /// Vertex indices, counter-clockwise when viewed from outside.
    pub indices: SmallVec<[u32; 4]>,
    /// Face color, if the source carried one.
    pub color: Option<FaceColor>,
}

impl Face {
    /// Create an uncolored face from vertex indices.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::Face;
    ///
    /// let quad = Face::new([0, 1, 2, 3]);
    /// assert_eq!(quad.len(), 4);
    /// assert!(quad.color.is_none());
    /// ```
    #[must_use]
    pub fn new(indices: impl IntoIterator<Item = u32>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
            color: None,
        }
    }

    /// Number of corners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True if the face has no indices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate the vertex indices as `usize`.
    pub fn vertex_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().map(|&i| i as usize)
    }
}

/// An indexed polygon mesh.
///
/// Vertices and faces are stored separately, with faces referencing
/// vertices by index. Vertex order is significant: downstream analysis
/// reports results per vertex index, so operations that produce a new mesh
/// (such as [`PolyMesh::scaled`]) keep vertices one-to-one.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from outside,
/// so normals point outward by the right-hand rule.
///
/// # Example
///
/// ```
/// use mesh_types::{Face, MeshTopology, Point3, PolyMesh};
///
/// let mut mesh = PolyMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(1.0, 1.0, 0.0));
/// mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.faces.push(Face::new([0, 1, 2, 3]));
///
/// assert_eq!(mesh.vertex_count(), 4);
/// assert_eq!(mesh.face_count(), 1);
/// assert!(mesh.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolyMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Polygon faces indexing into `vertices`.
    pub faces: Vec<Face>,
}

impl PolyMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    ///
    /// No validation is performed; call [`PolyMesh::validate`] when the
    /// parts come from an untrusted source.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Check that every face has at least three corners and every index
    /// refers to an existing vertex.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in face order.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::DegenerateFace {
                    face: face_index,
                    corners: face.len(),
                });
            }
            if let Some(index) = face.vertex_indices().find(|&i| i >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face: face_index,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Return a copy of this mesh scaled uniformly around the origin.
    ///
    /// Vertex `i` of the result is vertex `i` of `self` times `factor`;
    /// faces and colors are unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Point3, PolyMesh};
    ///
    /// let mesh = PolyMesh::from_parts(vec![Point3::new(2.0, 4.0, 6.0)], Vec::new());
    /// let half = mesh.scaled(0.5);
    /// assert_eq!(half.vertices[0], Point3::new(1.0, 2.0, 3.0));
    /// assert_eq!(mesh.vertices[0], Point3::new(2.0, 4.0, 6.0));
    /// ```
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| Point3::from(v.coords * factor))
                .collect(),
            faces: self.faces.clone(),
        }
    }

    fn resolve(&self, face: &Face) -> Polygon {
        Polygon::new(
            face.vertex_indices()
                .filter_map(|i| self.vertices.get(i).copied()),
        )
    }
}

impl MeshTopology for PolyMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn polygon(&self, face_index: usize) -> Option<Polygon> {
        self.faces.get(face_index).map(|f| self.resolve(f))
    }
}

impl MeshBounds for PolyMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }
}

/// Helper function to create an open cylinder made of quads.
///
/// The cylinder runs along +Z from `z = 0` to `z = length`, with `rings`
/// vertex rings and `segments` vertices per ring. Ring `k`, segment `j` is
/// vertex `k * segments + j`, at angle `2π·j / segments` from +X. Normals
/// point outward.
///
/// Returns an empty mesh when `rings < 2` or `segments < 3`.
///
/// # Example
///
/// ```
/// use mesh_types::{open_cylinder, MeshTopology};
///
/// let tube = open_cylinder(10.0, 100.0, 51, 36);
/// assert_eq!(tube.vertex_count(), 51 * 36);
/// assert_eq!(tube.face_count(), 50 * 36);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32, so vertex counts > 4B are unsupported
pub fn open_cylinder(radius: f64, length: f64, rings: usize, segments: usize) -> PolyMesh {
    if rings < 2 || segments < 3 {
        return PolyMesh::new();
    }

    let mut mesh = PolyMesh::with_capacity(rings * segments, (rings - 1) * segments);

    for k in 0..rings {
        let z = length * k as f64 / (rings - 1) as f64;
        for j in 0..segments {
            let angle = std::f64::consts::TAU * j as f64 / segments as f64;
            mesh.vertices
                .push(Point3::new(radius * angle.cos(), radius * angle.sin(), z));
        }
    }

    for k in 0..rings - 1 {
        for j in 0..segments {
            let a = (k * segments + j) as u32;
            let b = (k * segments + (j + 1) % segments) as u32;
            let c = ((k + 1) * segments + (j + 1) % segments) as u32;
            let d = ((k + 1) * segments + j) as u32;
            mesh.faces.push(Face::new([a, b, c, d]));
        }
    }

    mesh
}
