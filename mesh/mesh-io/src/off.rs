//! OFF (Object File Format) support.
//!
//! OFF is the plain-text polygon format used by Geomview and most mesh
//! processing toolkits. A file is a header, a count line and then one line
//! per vertex and per face:
//!
//! ```text
//! OFF
//! # comment
//! 4 1 0
//! 0 0 0
//! 1 0 0
//! 1 1 0
//! 0 1 0
//! 4 0 1 2 3 0 255 0
//! ```
//!
//! # Supported Features
//!
//! - `OFF` and `COFF` headers, counts on the header line or the next one
//! - `#` comments and blank lines anywhere
//! - Extra vertex columns (such as COFF vertex colors) are ignored
//! - Polygon faces of any arity, with an optional trailing RGB or RGBA
//!   color given either as integers in `0..=255` or floats in `[0, 1]`
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_off, save_off};
//!
//! let mesh = load_off("scan.off").unwrap();
//! save_off(&mesh, "copy.off").unwrap();
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{Face, FaceColor, PolyMesh};
use nalgebra::Point3;
use smallvec::SmallVec;

use crate::error::{IoError, IoResult, open_existing};

/// Load a mesh from an OFF file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or read
/// - The header is not `OFF` or `COFF`
/// - A count, coordinate or index fails to parse
/// - A face references a vertex index outside the vertex list
/// - The file ends before all announced vertices and faces are read
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_off;
///
/// let mesh = load_off("scan.off").unwrap();
/// println!("Loaded {} vertices, {} faces", mesh.vertices.len(), mesh.faces.len());
/// ```
pub fn load_off<P: AsRef<Path>>(path: P) -> IoResult<PolyMesh> {
    let file = open_existing(path.as_ref())?;
    read_off(BufReader::new(file))
}

/// Header counts are untrusted; larger meshes grow past this.
const MAX_PREALLOCATED: usize = 1 << 20;

/// Read a mesh in OFF format from any buffered reader.
///
/// # Errors
///
/// See [`load_off`].
pub fn read_off<R: BufRead>(reader: R) -> IoResult<PolyMesh> {
    let mut lines = MeaningfulLines::new(reader);

    let header = lines
        .next_line()?
        .ok_or_else(|| IoError::invalid_content("empty OFF file"))?;
    let mut tokens = header.split_whitespace();
    let keyword = tokens.next().unwrap_or_default();
    if keyword != "OFF" && keyword != "COFF" {
        return Err(IoError::InvalidHeader {
            found: keyword.to_string(),
        });
    }

    // Counts may share the header line ("OFF 8 6 12")
    let inline_counts: Vec<&str> = tokens.collect();
    let counts_line;
    let counts: Vec<&str> = if inline_counts.is_empty() {
        counts_line = lines
            .next_line()?
            .ok_or_else(|| IoError::invalid_content("missing OFF count line"))?;
        counts_line.split_whitespace().collect()
    } else {
        inline_counts
    };
    if counts.len() < 2 {
        return Err(IoError::invalid_content(format!(
            "OFF count line needs vertex and face counts, got {counts:?}"
        )));
    }
    let vertex_count: usize = counts[0].parse()?;
    let face_count: usize = counts[1].parse()?;

    let mut mesh = PolyMesh::with_capacity(
        vertex_count.min(MAX_PREALLOCATED),
        face_count.min(MAX_PREALLOCATED),
    );

    while mesh.vertices.len() < vertex_count {
        let Some(line) = lines.next_line()? else {
            return Err(IoError::UnexpectedEof {
                element: "vertices",
                expected: vertex_count,
                got: mesh.vertices.len(),
            });
        };
        mesh.vertices.push(parse_vertex(&line)?);
    }

    while mesh.faces.len() < face_count {
        let Some(line) = lines.next_line()? else {
            return Err(IoError::UnexpectedEof {
                element: "faces",
                expected: face_count,
                got: mesh.faces.len(),
            });
        };
        mesh.faces.push(parse_face(&line, vertex_count)?);
    }

    Ok(mesh)
}

/// Save a mesh to an OFF file.
///
/// Faces with a color are written with a trailing float RGBA tuple.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_off<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_off(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh in OFF format to any writer.
///
/// Coordinates use Rust's shortest round-trip float formatting, so a
/// write followed by [`read_off`] reproduces every vertex exactly.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_off<W: Write>(mesh: &PolyMesh, mut writer: W) -> IoResult<()> {
    writeln!(writer, "OFF")?;
    writeln!(writer, "{} {} 0", mesh.vertices.len(), mesh.faces.len())?;

    for v in &mesh.vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for face in &mesh.faces {
        write!(writer, "{}", face.indices.len())?;
        for index in &face.indices {
            write!(writer, " {index}")?;
        }
        if let Some(color) = face.color {
            let [r, g, b, a] = color.to_float();
            write!(writer, " {r:.3} {g:.3} {b:.3} {a:.3}")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn parse_vertex(line: &str) -> IoResult<Point3<f64>> {
    let mut tokens = line.split_whitespace();
    let mut coord = || -> IoResult<f64> {
        let token = tokens
            .next()
            .ok_or_else(|| IoError::invalid_content(format!("vertex line too short: {line:?}")))?;
        Ok(token.parse()?)
    };
    let x = coord()?;
    let y = coord()?;
    let z = coord()?;
    Ok(Point3::new(x, y, z))
}

fn parse_face(line: &str, vertex_count: usize) -> IoResult<Face> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((arity, rest)) = tokens.split_first() else {
        return Err(IoError::invalid_content("empty face line"));
    };
    let arity: usize = arity.parse()?;
    if arity < 3 {
        return Err(IoError::invalid_content(format!(
            "face with {arity} corners: {line:?}"
        )));
    }
    if rest.len() < arity {
        return Err(IoError::invalid_content(format!(
            "face announces {arity} corners but lists {}: {line:?}",
            rest.len()
        )));
    }

    let mut indices: SmallVec<[u32; 4]> = SmallVec::with_capacity(arity);
    for token in &rest[..arity] {
        let index: u32 = token.parse()?;
        if index as usize >= vertex_count {
            return Err(IoError::invalid_content(format!(
                "face references vertex {index} but only {vertex_count} vertices exist"
            )));
        }
        indices.push(index);
    }

    Ok(Face {
        indices,
        color: parse_color(&rest[arity..])?,
    })
}

/// Interpret trailing face tokens as a color.
///
/// Three or four integer tokens are 8-bit levels; anything with a decimal
/// point or exponent is read as floats in `[0, 1]`. Other token counts
/// (such as a single colormap index) carry no color.
fn parse_color(tokens: &[&str]) -> IoResult<Option<FaceColor>> {
    if tokens.len() != 3 && tokens.len() != 4 {
        return Ok(None);
    }

    if tokens.iter().all(|t| t.parse::<i64>().is_ok()) {
        let mut levels = [255_u8; 4];
        for (slot, token) in levels.iter_mut().zip(tokens) {
            let value: i64 = token.parse()?;
            *slot = u8::try_from(value.clamp(0, 255)).unwrap_or(u8::MAX);
        }
        let [r, g, b, a] = levels;
        return Ok(Some(FaceColor::with_alpha(r, g, b, a)));
    }

    let mut levels = [1.0_f32; 4];
    for (slot, token) in levels.iter_mut().zip(tokens) {
        *slot = token.parse()?;
    }
    let [r, g, b, a] = levels;
    Ok(Some(FaceColor::from_float(r, g, b, a)))
}

/// Lines with comments stripped, skipping those left blank.
struct MeaningfulLines<R> {
    inner: std::io::Lines<R>,
}

impl<R: BufRead> MeaningfulLines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
        }
    }

    fn next_line(&mut self) -> IoResult<Option<String>> {
        for line in self.inner.by_ref() {
            let line = line?;
            let content = line.split('#').next().unwrap_or_default().trim();
            if !content.is_empty() {
                return Ok(Some(content.to_string()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_types::{MeshTopology, open_cylinder};

    fn read_str(text: &str) -> IoResult<PolyMesh> {
        read_off(text.as_bytes())
    }

    #[test]
    fn parses_quad_with_comments_and_color() {
        let mesh = read_str(
            "# leading comment\nOFF\n\n4 1 0 # counts\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3 0 255 0\n",
        )
        .unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces[0].indices.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(mesh.faces[0].color, Some(FaceColor::GREEN));
    }

    #[test]
    fn counts_on_header_line_and_extra_columns() {
        let mesh = read_str("COFF 3 1 0\n0 0 0 255 0 0 255\n1 0 0 0 255 0 255\n0 1 0 0 0 255 255\n3 0 1 2\n")
            .unwrap();
        assert_eq!(mesh.vertices[1], Point3::new(1.0, 0.0, 0.0));
        assert!(mesh.faces[0].color.is_none());
    }

    #[test]
    fn float_colors_are_unit_range() {
        let mesh = read_str("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2 1.0 0.5 0.0 0.25\n").unwrap();
        assert_eq!(
            mesh.faces[0].color,
            Some(FaceColor::with_alpha(255, 128, 0, 64))
        );
    }

    #[test]
    fn rejects_out_of_range_index() {
        let result = read_str("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 3\n");
        assert!(matches!(result, Err(IoError::InvalidContent { .. })));
    }

    #[test]
    fn rejects_bad_header_and_truncation() {
        assert!(matches!(
            read_str("PLY\n0 0 0\n"),
            Err(IoError::InvalidHeader { .. })
        ));
        assert!(matches!(
            read_str("OFF\n3 1 0\n0 0 0\n1 0 0\n"),
            Err(IoError::UnexpectedEof {
                element: "vertices",
                expected: 3,
                got: 2
            })
        ));
        assert!(matches!(
            read_str("OFF\n3 1 0\n0 0 0\n1 0 0\n0 x 0\n3 0 1 2\n"),
            Err(IoError::ParseFloat(_))
        ));
        assert!(read_str("").is_err());
    }

    #[test]
    fn huge_counts_fail_on_missing_lines() {
        assert!(matches!(
            read_str("OFF\n100000000000000 0 0\n0 0 0\n"),
            Err(IoError::UnexpectedEof {
                element: "vertices",
                expected: 100_000_000_000_000,
                got: 1
            })
        ));
        assert!(matches!(
            read_str("OFF\n3 100000000000000 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n"),
            Err(IoError::UnexpectedEof {
                element: "faces",
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn write_then_read_is_lossless() {
        let mut mesh = open_cylinder(10.0, 30.0, 4, 12);
        mesh.faces[5].color = Some(FaceColor::GREEN);
        mesh.faces[6].color = Some(FaceColor::with_alpha(12, 200, 77, 128));

        let mut buffer = Vec::new();
        write_off(&mesh, &mut buffer).unwrap();
        let loaded = read_off(buffer.as_slice()).unwrap();

        assert_eq!(loaded, mesh);
    }

    #[test]
    fn roundtrip_file() {
        let original = open_cylinder(2.5, 7.0, 3, 5);
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tube.off");

        save_off(&original, &path).unwrap();
        let loaded = load_off(&path).unwrap();

        assert_eq!(loaded.vertex_count(), original.vertex_count());
        assert_eq!(loaded.face_count(), original.face_count());
        for (a, b) in loaded.faces.iter().zip(&original.faces) {
            assert_eq!(a.indices, b.indices);
        }
        assert_eq!(loaded.vertices, original.vertices);
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_off("nonexistent_file_12345.off");
        if let Err(IoError::FileNotFound { path }) = result {
            assert!(path.to_string_lossy().contains("nonexistent"));
        } else {
            panic!("expected FileNotFound");
        }
    }
}
