//! Benchmarks for mesh-io operations.
//!
//! Run with: cargo bench -p mesh-io
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-io -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-io -- --baseline main

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_io::{load_off, read_off, save_indexed_values, save_off, write_off};
use mesh_types::{FaceColor, open_cylinder};
use tempfile::tempdir;

// =============================================================================
// I/O Benchmarks
// =============================================================================

fn bench_off(c: &mut Criterion) {
    let mut group = c.benchmark_group("OFF");

    // 200 rings of 90 quads, every tenth face colored
    let mut tube = open_cylinder(50.0, 400.0, 201, 90);
    for face in tube.faces.iter_mut().step_by(10) {
        face.color = Some(FaceColor::GREEN);
    }
    let temp_dir = tempdir().expect("failed to create temp dir");
    let off_path = temp_dir.path().join("bench_tube.off");
    save_off(&tube, &off_path).expect("failed to save OFF");

    let mut encoded = Vec::new();
    write_off(&tube, &mut encoded).expect("failed to encode OFF");

    group.throughput(Throughput::Elements(tube.faces.len() as u64));

    group.bench_function("load_off", |b| b.iter(|| load_off(black_box(&off_path))));

    group.bench_function("read_off_memory", |b| {
        b.iter(|| read_off(black_box(encoded.as_slice())));
    });

    let out_off = temp_dir.path().join("bench_out.off");
    group.bench_function("save_off", |b| {
        b.iter(|| save_off(black_box(&tube), black_box(&out_off)));
    });

    group.finish();
}

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("Text");

    let values: Vec<f64> = (0..100_000).map(|i| f64::from(i) * 0.37).collect();
    let temp_dir = tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("bench_values.txt");

    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("save_indexed_values", |b| {
        b.iter(|| save_indexed_values(black_box(&values), black_box(&path)));
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_off, bench_text);
criterion_main!(benches);
