//! Construction benchmarks across dimensions and point counts.
//!
//! The determinant kernel dominates: every facet costs `D + 1` determinant
//! calls, so higher dimensions stress the matrix scratch paths while large
//! 2D/3D clouds stress partitioning and the ranking queue.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndhull::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5eed;

fn random_points<const D: usize>(n: usize) -> Vec<Point<f64, D>> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..n)
        .map(|_| Point::new(std::array::from_fn(|_| rng.gen_range(-1.0..1.0))))
        .collect()
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("hull_construction");
    for &n in &[100_usize, 1_000] {
        let points = random_points::<2>(n);
        group.bench_with_input(BenchmarkId::new("2d", n), &points, |b, points| {
            b.iter(|| QuickHull::build(points, 1e-12).unwrap().facet_count());
        });
        let points = random_points::<3>(n);
        group.bench_with_input(BenchmarkId::new("3d", n), &points, |b, points| {
            b.iter(|| QuickHull::build(points, 1e-12).unwrap().facet_count());
        });
        let points = random_points::<4>(n);
        group.bench_with_input(BenchmarkId::new("4d", n), &points, |b, points| {
            b.iter(|| QuickHull::build(points, 1e-12).unwrap().facet_count());
        });
    }
    group.finish();
}

fn bench_certification(c: &mut Criterion) {
    let points = random_points::<3>(1_000);
    let hull = QuickHull::build(&points, 1e-12).unwrap();
    c.bench_function("certify_3d_1000", |b| b.iter(|| hull.check()));
}

criterion_group!(benches, bench_construction, bench_certification);
criterion_main!(benches);
