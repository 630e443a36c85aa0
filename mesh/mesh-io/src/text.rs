//! Plain-text exports: index lists, per-index values and point lists.
//!
//! These are the side artifacts of an inspection run. Every format is one
//! record per line with whitespace-separated fields, so the files load into
//! spreadsheets and numpy without a schema.
//!
//! | Writer | Line format |
//! |---|---|
//! | [`save_index_list`] | `<index>` |
//! | [`save_indexed_values`] | `<index> <value>` |
//! | [`save_points`] | `<x> <y> <z>` |

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{IoError, IoResult, open_existing};

/// Save indices one per line.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use mesh_io::save_index_list;
///
/// save_index_list(&[3, 17, 42], "defects.id").unwrap();
/// ```
pub fn save_index_list<P: AsRef<Path>>(indices: &[usize], path: P) -> IoResult<()> {
    write_to(path.as_ref(), |w| write_index_list(indices, w))
}

/// Write indices one per line to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_index_list<W: Write>(indices: &[usize], mut writer: W) -> IoResult<()> {
    for index in indices {
        writeln!(writer, "{index}")?;
    }
    Ok(())
}

/// Load an index list written by [`save_index_list`].
///
/// Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not an index.
pub fn load_index_list<P: AsRef<Path>>(path: P) -> IoResult<Vec<usize>> {
    let reader = BufReader::new(open_existing(path.as_ref())?);
    let mut indices = Vec::new();
    for_each_record(reader, |fields| {
        indices.push(fields[0].parse()?);
        Ok(())
    })?;
    Ok(indices)
}

/// Save `values[i]` as `<i> <value>` lines.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_indexed_values<P: AsRef<Path>>(values: &[f64], path: P) -> IoResult<()> {
    write_to(path.as_ref(), |w| write_indexed_values(values, w))
}

/// Write `values[i]` as `<i> <value>` lines to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_indexed_values<W: Write>(values: &[f64], mut writer: W) -> IoResult<()> {
    for (index, value) in values.iter().enumerate() {
        writeln!(writer, "{index} {value}")?;
    }
    Ok(())
}

/// Save points as `x y z` lines.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_points<P: AsRef<Path>>(points: &[Point3<f64>], path: P) -> IoResult<()> {
    write_to(path.as_ref(), |w| write_points(points, w))
}

/// Write points as `x y z` lines to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_points<W: Write>(points: &[Point3<f64>], mut writer: W) -> IoResult<()> {
    for p in points {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Load a point list written by [`save_points`].
///
/// Columns after the third are ignored.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line has fewer than
/// three numeric fields.
pub fn load_points<P: AsRef<Path>>(path: P) -> IoResult<Vec<Point3<f64>>> {
    read_points(BufReader::new(open_existing(path.as_ref())?))
}

/// Read a point list from any buffered reader.
///
/// # Errors
///
/// See [`load_points`].
pub fn read_points<R: BufRead>(reader: R) -> IoResult<Vec<Point3<f64>>> {
    let mut points = Vec::new();
    for_each_record(reader, |fields| {
        if fields.len() < 3 {
            return Err(IoError::invalid_content(format!(
                "point line needs 3 coordinates, got {}",
                fields.len()
            )));
        }
        points.push(Point3::new(
            fields[0].parse()?,
            fields[1].parse()?,
            fields[2].parse()?,
        ));
        Ok(())
    })?;
    Ok(points)
}

fn write_to<F>(path: &Path, body: F) -> IoResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> IoResult<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    body(&mut writer)?;
    writer.flush()?;
    Ok(())
}

fn for_each_record<R, F>(reader: R, mut handle: F) -> IoResult<()>
where
    R: BufRead,
    F: FnMut(&[&str]) -> IoResult<()>,
{
    for line in reader.lines() {
        let line = line?;
        let content = line.split('#').next().unwrap_or_default();
        let fields: Vec<&str> = content.split_whitespace().collect();
        if !fields.is_empty() {
            handle(&fields)?;
        }
    }
    Ok(())
}
