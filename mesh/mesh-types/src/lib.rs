//! Core mesh types for tube inspection.
//!
//! This crate provides the foundational types for the polygon meshes that
//! scanners and reconstruction tools emit:
//!
//! - [`PolyMesh`] - A polygon mesh with indexed vertices
//! - [`Face`] - Vertex indices plus an optional [`FaceColor`]
//! - [`Polygon`] - A concrete polygon with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**. Face winding is
//! **counter-clockwise (CCW) when viewed from outside**, so normals point
//! outward by the right-hand rule. For a tube scanned from the outside the
//! centerline therefore lies against the normals.
//!
//! # Example
//!
//! ```
//! use mesh_types::{Face, MeshBounds, MeshTopology, Point3, PolyMesh};
//!
//! let mut mesh = PolyMesh::new();
//! mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(0.5, 1.0, 0.0));
//! mesh.faces.push(Face::new([0, 1, 2]));
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.is_empty());
//! assert!((mesh.bounds().max.y - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::cast_precision_loss)]

mod bounds;
mod color;
mod error;
mod mesh;
mod polygon;
mod traits;

// Re-export core types
pub use bounds::Aabb;
pub use color::FaceColor;
pub use error::MeshError;
pub use mesh::{Face, PolyMesh, open_cylinder};
pub use polygon::Polygon;
pub use traits::{MeshBounds, MeshTopology};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
