use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use nalgebra::Matrix3;
use pwbasis::symmetries::find_lattice_symmetries;
use pwbasis::GvecSet;

/// Construction cost of the G-vector set at realistic cutoffs
fn bench_gvec_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("gvec_construction");

    let cubic = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
    );

    group.bench_function("cubic_cutoff_4", |b| {
        b.iter(|| GvecSet::solo(black_box(cubic), black_box(4.0), false).unwrap());
    });

    group.bench_function("cubic_cutoff_8", |b| {
        b.iter(|| GvecSet::solo(black_box(cubic), black_box(8.0), false).unwrap());
    });

    group.bench_function("cubic_cutoff_8_reduced", |b| {
        b.iter(|| GvecSet::solo(black_box(cubic), black_box(8.0), true).unwrap());
    });

    group.finish();
}

/// Cost of the exhaustive point-group search
fn bench_lattice_symmetries(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice_symmetries");

    let hexagonal = Matrix3::new(
        1.0, -0.5, 0.0,
        0.0, 3.0_f64.sqrt() / 2.0, 0.0,
        0.0, 0.0, 1.6,
    );

    group.bench_function("hexagonal_point_group", |b| {
        b.iter(|| find_lattice_symmetries(black_box(&hexagonal), black_box(1e-6)));
    });

    group.finish();
}

criterion_group!(gvec_benches, bench_gvec_construction, bench_lattice_symmetries);
criterion_main!(gvec_benches);
