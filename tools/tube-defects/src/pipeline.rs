//! Load, track, smooth, segment and export.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use cf_spatial::GridBounds;
use mesh_centerline::{StopReason, smooth_centerline, track_centerline};
use mesh_defect::{
    FaceStatus, GradientColorMap, classify_faces, defect_flags, face_mean_values,
    faces_with_status, segment_defects,
};
use mesh_io::{IoError, load_off, save_index_list, save_indexed_values, save_off, save_points};
use mesh_types::{FaceColor, MeshBounds, MeshTopology, Point3, PolyMesh};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// In-memory results of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Tracked centerline, scaled back to native units.
    pub raw_centerline: Vec<Point3<f64>>,
    /// Why tracking stopped.
    pub stop: StopReason,
    /// Tube radius at the end of the track, native units.
    pub ring_radius: f64,
    /// Smoothed centerline in native units.
    pub centerline: Vec<Point3<f64>>,
    /// Distance from each vertex to the centerline.
    pub distances: Vec<f64>,
    /// Distance above the patch reference, per vertex.
    pub residuals: Vec<f64>,
    /// Defective vertex indices, ascending.
    pub defects: Vec<usize>,
    /// Classification of every face.
    pub face_status: Vec<FaceStatus>,
    /// Faces whose vertices are all defective.
    pub defect_faces: Vec<usize>,
    /// Number of patches in the segmentation grid.
    pub patch_count: usize,
}

/// Counts and lengths of a finished run, written as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Input mesh path.
    pub input: PathBuf,
    /// Input vertex count.
    pub vertices: usize,
    /// Input face count.
    pub faces: usize,
    /// Voxel size used for tracking.
    pub voxel_size: f64,
    /// Why tracking stopped.
    pub stop_reason: StopReason,
    /// Points in the raw centerline.
    pub raw_centerline_points: usize,
    /// Length of the raw centerline.
    pub raw_centerline_length: f64,
    /// Points in the smoothed centerline.
    pub centerline_points: usize,
    /// Length of the smoothed centerline.
    pub centerline_length: f64,
    /// Tube radius at the end of the track.
    pub ring_radius: f64,
    /// Patches in the segmentation grid.
    pub patch_count: usize,
    /// Defective vertices.
    pub defect_points: usize,
    /// Fully defective faces.
    pub defect_faces: usize,
}

/// Run the whole pipeline from `config.input` and write every artifact.
///
/// # Errors
///
/// Returns [`PipelineError::Config`](crate::PipelineError::Config) before any
/// work if the configuration is invalid, and
/// [`PipelineError::Io`](crate::PipelineError::Io) if the mesh cannot be read
/// or an artifact cannot be written.
pub fn run(config: &PipelineConfig) -> PipelineResult<RunSummary> {
    config.validate()?;

    let mesh = load_off(config.input())?;
    info!(
        path = %config.input().display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Loaded mesh"
    );

    let analysis = analyze(&mesh, config)?;
    write_outputs(&mesh, &analysis, config)?;

    let summary = summarize(&mesh, &analysis, config);
    if let Some(path) = &config.summary {
        let file = File::create(path).map_err(IoError::from)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)?;
        debug!(path = %path.display(), "Wrote summary");
    }

    info!(
        defects = summary.defect_points,
        defect_faces = summary.defect_faces,
        stop = %summary.stop_reason,
        "Pipeline complete"
    );
    Ok(summary)
}

/// Track, smooth and segment an already loaded mesh.
///
/// The mesh is in native units. Only tracking runs on the voxel-scaled copy.
///
/// # Errors
///
/// Returns [`PipelineError::Config`](crate::PipelineError::Config) if the
/// configuration is invalid and
/// [`PipelineError::Mesh`](crate::PipelineError::Mesh) if a face is shorter
/// than a triangle or indexes a missing vertex.
pub fn analyze(mesh: &PolyMesh, config: &PipelineConfig) -> PipelineResult<Analysis> {
    config.validate()?;
    mesh.validate()?;
    let voxel_size = config.voxel_size;

    let scaled = mesh.scaled(1.0 / voxel_size);
    let track = track_centerline(&scaled, &config.tracker_params());
    let raw_centerline: Vec<Point3<f64>> = track.points.iter().map(|p| *p * voxel_size).collect();
    info!(
        points = raw_centerline.len(),
        stop = %track.stop,
        "Tracked raw centerline"
    );

    let centerline = smooth_in_domain(mesh, &raw_centerline, config);

    let vertex_count = mesh.vertex_count();
    let (distances, residuals, defects, patch_count) = if centerline.is_empty() {
        warn!("Centerline is empty, reporting zero distances and no defects");
        (vec![0.0; vertex_count], vec![0.0; vertex_count], Vec::new(), 0)
    } else {
        let result = segment_defects(&mesh.vertices, &centerline, &config.segment_params())?;
        (result.distances, result.residuals, result.defects, result.patch_count)
    };

    let face_status = classify_faces(mesh, &defect_flags(vertex_count, &defects));
    let defect_faces = faces_with_status(&face_status, FaceStatus::Defective);
    debug!(
        defects = defects.len(),
        defect_faces = defect_faces.len(),
        "Classified faces"
    );

    Ok(Analysis {
        raw_centerline,
        stop: track.stop,
        ring_radius: track.ring_radius * voxel_size,
        centerline,
        distances,
        residuals,
        defects,
        face_status,
        defect_faces,
        patch_count,
    })
}

/// Smooth the raw centerline inside the integer box around the mesh.
fn smooth_in_domain(mesh: &PolyMesh, raw: &[Point3<f64>], config: &PipelineConfig) -> Vec<Point3<f64>> {
    if raw.is_empty() {
        return Vec::new();
    }
    let Some(bounds) = mesh.bounds_opt() else {
        return raw.to_vec();
    };
    match GridBounds::enclosing(&bounds.min, &bounds.max) {
        Ok(domain) => {
            let smooth = smooth_centerline(raw, &domain, &config.smooth_params());
            info!(points = smooth.len(), "Smoothed centerline");
            smooth
        }
        Err(err) => {
            warn!(%err, "Mesh bounds do not fit a grid, keeping the raw centerline");
            raw.to_vec()
        }
    }
}

/// The voxel-scaled mesh with every face colored by the mean distance of
/// its vertices to the centerline.
///
/// # Errors
///
/// Returns [`PipelineError::Segment`](crate::PipelineError::Segment) if the
/// configured error range cannot form a color map.
pub fn error_mesh(
    mesh: &PolyMesh,
    analysis: &Analysis,
    config: &PipelineConfig,
) -> PipelineResult<PolyMesh> {
    jet_mesh(mesh, &analysis.distances, config)
}

/// The voxel-scaled mesh with every face colored by its mean residual.
///
/// # Errors
///
/// See [`error_mesh`].
pub fn residual_mesh(
    mesh: &PolyMesh,
    analysis: &Analysis,
    config: &PipelineConfig,
) -> PipelineResult<PolyMesh> {
    jet_mesh(mesh, &analysis.residuals, config)
}

fn jet_mesh(mesh: &PolyMesh, values: &[f64], config: &PipelineConfig) -> PipelineResult<PolyMesh> {
    let (lo, hi) = config.error_range;
    let jet = GradientColorMap::jet(lo, hi)?;

    let mut scaled = mesh.scaled(1.0 / config.voxel_size);
    let means = face_mean_values(&scaled, values);
    for (face, value) in scaled.faces.iter_mut().zip(means) {
        face.color = Some(jet.color(value));
    }
    Ok(scaled)
}

/// The native mesh with fully defective faces in green.
#[must_use]
pub fn defect_mesh(mesh: &PolyMesh, defect_faces: &[usize]) -> PolyMesh {
    let mut marked = mesh.clone();
    for &i in defect_faces {
        if let Some(face) = marked.faces.get_mut(i) {
            face.color = Some(FaceColor::GREEN);
        }
    }
    marked
}

/// Write the standard artifacts and any optional ones the config names.
///
/// # Errors
///
/// Returns [`PipelineError::Io`](crate::PipelineError::Io) on the first
/// failed write.
pub fn write_outputs(
    mesh: &PolyMesh,
    analysis: &Analysis,
    config: &PipelineConfig,
) -> PipelineResult<()> {
    let error_path = config.output_path("error.off");
    save_off(&error_mesh(mesh, analysis, config)?, &error_path)?;

    let defect_path = config.output_path("defect.off");
    save_off(&defect_mesh(mesh, &analysis.defect_faces), &defect_path)?;
    save_index_list(&analysis.defects, config.output_path("defect.id"))?;
    save_index_list(&analysis.defect_faces, config.output_path("def-faces.id"))?;
    info!(prefix = %config.output_prefix, "Wrote defect artifacts");

    if let Some(path) = &config.residual_map {
        save_off(&residual_mesh(mesh, analysis, config)?, path)?;
        debug!(path = %path.display(), "Wrote residual map");
    }
    if let Some(path) = &config.centerline {
        save_points(&analysis.centerline, path)?;
        debug!(path = %path.display(), "Wrote centerline");
    }
    if let Some(path) = &config.raw_centerline {
        save_points(&analysis.raw_centerline, path)?;
        debug!(path = %path.display(), "Wrote raw centerline");
    }
    if let Some(path) = &config.distances {
        save_indexed_values(&analysis.distances, path)?;
        debug!(path = %path.display(), "Wrote distances");
    }
    Ok(())
}

/// Summarize a finished analysis.
#[must_use]
pub fn summarize(mesh: &PolyMesh, analysis: &Analysis, config: &PipelineConfig) -> RunSummary {
    RunSummary {
        input: config.input.clone(),
        vertices: mesh.vertex_count(),
        faces: mesh.face_count(),
        voxel_size: config.voxel_size,
        stop_reason: analysis.stop,
        raw_centerline_points: analysis.raw_centerline.len(),
        raw_centerline_length: path_length(&analysis.raw_centerline),
        centerline_points: analysis.centerline.len(),
        centerline_length: path_length(&analysis.centerline),
        ring_radius: analysis.ring_radius,
        patch_count: analysis.patch_count,
        defect_points: analysis.defects.len(),
        defect_faces: analysis.defect_faces.len(),
    }
}

fn path_length(points: &[Point3<f64>]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Face, MeshError, open_cylinder};

    #[test]
    fn test_empty_mesh_degrades_gracefully() {
        let config = PipelineConfig::new("unused.off", 5.0, 1.0);
        let analysis = analyze(&PolyMesh::new(), &config).unwrap();
        assert!(analysis.raw_centerline.is_empty());
        assert!(analysis.centerline.is_empty());
        assert_eq!(analysis.stop, StopReason::NoSeed);
        assert!(analysis.defects.is_empty());
    }

    #[test]
    fn test_flat_mesh_reports_zero_distances() {
        let mut mesh = open_cylinder(10.0, 20.0, 5, 12);
        for v in &mut mesh.vertices {
            v.z = 0.0;
        }
        let config = PipelineConfig::new("unused.off", 5.0, 1.0);
        let analysis = analyze(&mesh, &config).unwrap();

        assert!(analysis.centerline.is_empty());
        assert_eq!(analysis.distances, vec![0.0; mesh.vertices.len()]);
        assert!(analysis.defects.is_empty());
        assert!(analysis.face_status.iter().all(|s| *s == FaceStatus::Clean));
    }

    #[test]
    fn test_invalid_config_stops_early() {
        let mesh = open_cylinder(10.0, 50.0, 26, 24);
        let config = PipelineConfig::new("unused.off", 5.0, 1.0).with_voxel_size(-1.0);
        assert!(analyze(&mesh, &config).is_err());
    }

    #[test]
    fn test_malformed_mesh_is_rejected() {
        let mut mesh = open_cylinder(10.0, 20.0, 3, 8);
        mesh.faces.push(Face::new([0, 1, 999]));
        let config = PipelineConfig::new("unused.off", 5.0, 1.0);
        let err = analyze(&mesh, &config).unwrap_err();
        assert!(matches!(
            err,
            crate::PipelineError::Mesh(MeshError::IndexOutOfRange { index: 999, .. })
        ));
    }

    #[test]
    fn test_defect_mesh_colors_only_listed_faces() {
        let mesh = open_cylinder(10.0, 20.0, 3, 8);
        let marked = defect_mesh(&mesh, &[1, 5, 99]);
        let green: Vec<usize> = marked
            .faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| (f.color == Some(FaceColor::GREEN)).then_some(i))
            .collect();
        assert_eq!(green, vec![1, 5]);
        assert_eq!(marked.vertices, mesh.vertices);
    }

    /// Analysis that carries only per-vertex values.
    fn flat_analysis(mesh: &PolyMesh, distances: Vec<f64>, residuals: Vec<f64>) -> Analysis {
        Analysis {
            raw_centerline: Vec::new(),
            stop: StopReason::LostSurface,
            ring_radius: 0.0,
            centerline: Vec::new(),
            distances,
            residuals,
            defects: Vec::new(),
            face_status: vec![FaceStatus::Clean; mesh.face_count()],
            defect_faces: Vec::new(),
            patch_count: 1,
        }
    }

    #[test]
    fn test_error_mesh_is_scaled_and_colored() {
        let mesh = open_cylinder(10.0, 40.0, 21, 12);
        let config = PipelineConfig::new("unused.off", 5.0, 1.0).with_voxel_size(2.0);
        let analysis = analyze(&mesh, &config).unwrap();
        let colored = error_mesh(&mesh, &analysis, &config).unwrap();

        assert_eq!(colored.faces.len(), mesh.faces.len());
        assert!(colored.faces.iter().all(|f| f.color.is_some()));
        // Mid-tube faces sit at distance 10, the top of the range
        let mid = colored.faces[10 * 12].color.unwrap();
        assert_eq!((mid.r, mid.b), (255, 0));
        assert!(mid.g <= 2);
        assert_relative_eq!(colored.vertices[0].x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_error_mesh_follows_distances() {
        let mesh = open_cylinder(10.0, 20.0, 2, 8);
        let config = PipelineConfig::new("unused.off", 5.0, 1.0);
        let mut distances = vec![0.0; mesh.vertex_count()];
        for &v in &mesh.faces[0].indices {
            distances[v as usize] = 12.0;
        }
        // Residuals would paint every face blue
        let analysis = flat_analysis(&mesh, distances, vec![0.0; mesh.vertex_count()]);

        let error = error_mesh(&mesh, &analysis, &config).unwrap();
        assert_eq!(error.faces[0].color, Some(FaceColor::RED));
        assert_eq!(error.faces[4].color, Some(FaceColor::BLUE));

        let residual = residual_mesh(&mesh, &analysis, &config).unwrap();
        assert!(residual.faces.iter().all(|f| f.color == Some(FaceColor::BLUE)));
    }

    #[test]
    fn test_path_length() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
            Point3::new(3.0, 4.0, 2.0),
        ];
        assert_relative_eq!(path_length(&points), 7.0);
        assert_relative_eq!(path_length(&[]), 0.0);
    }
}
