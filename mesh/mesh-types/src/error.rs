//! Mesh validation errors.

use thiserror::Error;

/// Structural problems found by [`PolyMesh::validate`](crate::PolyMesh::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face has fewer than three corners.
    #[error("face {face} has only {corners} corners")]
    DegenerateFace {
        /// Face index.
        face: usize,
        /// Number of corners.
        corners: usize,
    },
}
