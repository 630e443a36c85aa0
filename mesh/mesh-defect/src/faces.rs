//! Per-face queries over per-vertex results.

// Face sizes are tiny; the cast to f64 is exact.
#![allow(clippy::cast_precision_loss)]

use mesh_types::PolyMesh;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How many of a face's vertices are defective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaceStatus {
    /// No defective vertex.
    Clean,
    /// Some, but not all, vertices are defective.
    Partial,
    /// Every vertex is defective.
    Defective,
}

/// Classify every face of `mesh` from per-vertex defect flags.
///
/// Vertices missing from `defect_flags` count as clean, and so does a face
/// with no vertices.
///
/// # Example
///
/// ```
/// use mesh_defect::{FaceStatus, classify_faces};
/// use mesh_types::{Face, Point3, PolyMesh};
///
/// let mut mesh = PolyMesh::new();
/// for i in 0..4 {
///     mesh.vertices.push(Point3::new(f64::from(i), 0.0, 0.0));
/// }
/// mesh.faces.push(Face::new([0, 1, 2]));
/// mesh.faces.push(Face::new([1, 2, 3]));
///
/// let status = classify_faces(&mesh, &[true, false, false, false]);
/// assert_eq!(status, vec![FaceStatus::Partial, FaceStatus::Clean]);
/// ```
#[must_use]
pub fn classify_faces(mesh: &PolyMesh, defect_flags: &[bool]) -> Vec<FaceStatus> {
    mesh.faces
        .par_iter()
        .map(|face| {
            let total = face.len();
            let flagged = face
                .vertex_indices()
                .filter(|&i| defect_flags.get(i).copied().unwrap_or(false))
                .count();
            match flagged {
                0 => FaceStatus::Clean,
                n if n == total => FaceStatus::Defective,
                _ => FaceStatus::Partial,
            }
        })
        .collect()
}

/// Turn a list of defective indices into `len` flags.
///
/// Indices past `len` are ignored.
#[must_use]
pub fn defect_flags(len: usize, defects: &[usize]) -> Vec<bool> {
    let mut flags = vec![false; len];
    for &i in defects {
        if let Some(flag) = flags.get_mut(i) {
            *flag = true;
        }
    }
    flags
}

/// Indices of the faces with the given status, ascending.
#[must_use]
pub fn faces_with_status(status: &[FaceStatus], wanted: FaceStatus) -> Vec<usize> {
    status
        .iter()
        .enumerate()
        .filter_map(|(i, s)| (*s == wanted).then_some(i))
        .collect()
}

/// Mean of a per-vertex value over each face's vertices.
///
/// Missing vertex values count as 0, as does an empty face.
#[must_use]
pub fn face_mean_values(mesh: &PolyMesh, vertex_values: &[f64]) -> Vec<f64> {
    mesh.faces
        .par_iter()
        .map(|face| {
            if face.is_empty() {
                return 0.0;
            }
            let sum: f64 = face
                .vertex_indices()
                .map(|i| vertex_values.get(i).copied().unwrap_or(0.0))
                .sum();
            sum / face.len() as f64
        })
        .collect()
}
