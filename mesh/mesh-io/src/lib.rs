//! Mesh file I/O for tube inspection.
//!
//! This crate provides loading and saving of polygon meshes and the
//! plain-text side artifacts of an inspection run:
//!
//! - **OFF / COFF** (Object File Format) - polygon meshes with optional
//!   per-face colors
//! - **Index lists** - one index per line
//! - **Indexed values** - `<index> <value>` per line
//! - **Point lists** - `x y z` per line
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_off, save_index_list, save_off};
//!
//! // Load a mesh
//! let mesh = load_off("scan.off").unwrap();
//!
//! // Save it back with the first face index exported
//! save_off(&mesh, "copy.off").unwrap();
//! save_index_list(&[0], "faces.id").unwrap();
//! ```
//!
//! Every reader has a `read_*` twin that works on any [`std::io::BufRead`],
//! and every writer a `write_*` twin over [`std::io::Write`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod off;
mod text;

pub use error::{IoError, IoResult};
pub use off::{load_off, read_off, save_off, write_off};
pub use text::{
    load_index_list, load_points, read_points, save_index_list, save_indexed_values, save_points,
    write_index_list, write_indexed_values, write_points,
};
