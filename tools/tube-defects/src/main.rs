//! Tube defect detection from the command line.
//!
//! # Example
//!
//! ```text
//! tube-defects -i scan.off -r 5 -s 1 -e 10 -b 1 -o results/scan
//! RUST_LOG=debug tube-defects -i scan.off -r 5 -s 1 --summary scan.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tube_defects::{PipelineConfig, run};

/// Track the centerline of a tubular mesh and flag surface defects
#[derive(Parser)]
#[command(name = "tube-defects")]
#[command(about = "Centerline tracking and defect segmentation for tubular meshes", long_about = None)]
#[command(version)]
struct Cli {
    /// Input mesh (OFF)
    #[arg(short, long)]
    input: PathBuf,

    /// Accumulation radius
    #[arg(short = 'r', long)]
    acc_radius: f64,

    /// Tracking step
    #[arg(short = 's', long)]
    track_step: f64,

    /// Treat face normals as pointing inward
    #[arg(short = 'n', long)]
    invert_normal: bool,

    /// Histogram bin width
    #[arg(short = 'b', long, default_value_t = 5.0)]
    bin_width: f64,

    /// Patch width along the centerline
    #[arg(short = 'a', long, default_value_t = 25.0)]
    patch_width: f64,

    /// Number of angular bands around the centerline
    #[arg(short = 'e', long, default_value_t = 100)]
    patch_height: usize,

    /// Voxel edge length in mesh units
    #[arg(long, default_value_t = 1.0)]
    voxel_size: f64,

    /// Prefix for the output files
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Also write the voxel-scaled mesh colored by residual
    #[arg(long)]
    residual_map: Option<PathBuf>,

    /// Also write the smoothed centerline
    #[arg(long)]
    centerline: Option<PathBuf>,

    /// Also write the raw tracked centerline
    #[arg(long)]
    raw_centerline: Option<PathBuf>,

    /// Also write per-vertex distances
    #[arg(long)]
    distances: Option<PathBuf>,

    /// Also write a JSON run summary
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let mut config = PipelineConfig::new(self.input, self.acc_radius, self.track_step)
            .with_output_prefix(self.output)
            .with_invert_normal(self.invert_normal)
            .with_voxel_size(self.voxel_size)
            .with_patches(self.patch_width, self.patch_height, self.bin_width);
        config.residual_map = self.residual_map;
        config.centerline = self.centerline;
        config.raw_centerline = self.raw_centerline;
        config.distances = self.distances;
        config.summary = self.summary;
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();
    run(&config).with_context(|| format!("failed to process {}", config.input.display()))?;
    Ok(())
}
