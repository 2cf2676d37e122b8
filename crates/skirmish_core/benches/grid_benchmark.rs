//! # Spatial Hash Benchmark
//!
//! Measures incremental relocation and neighbour queries.
//!
//! Run with: `cargo bench --package skirmish_core --bench grid_benchmark`

#![allow(missing_docs)]

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skirmish_core::{CellRange, SpatialHashGrid};
use skirmish_shared::Vec2;

const CELL_SIZE: f32 = 64.0;
const RADIUS: f32 = 12.0;

/// Deterministic scatter over a 4096×4096 field.
fn scatter(count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let f = i as f32;
            Vec2::new((f * 37.0) % 4096.0, (f * 91.0) % 4096.0)
        })
        .collect()
}

fn populate(points: &[Vec2]) -> (SpatialHashGrid<usize>, Vec<CellRange>) {
    let mut grid = SpatialHashGrid::new(CELL_SIZE);
    let ranges = points
        .iter()
        .enumerate()
        .map(|(key, point)| grid.insert(key, *point, RADIUS))
        .collect();
    (grid, ranges)
}

/// One step of movement for every collider.
fn bench_relocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_relocate");

    for count in [1_000, 10_000] {
        let mut points = scatter(count);
        let (mut grid, mut ranges) = populate(&points);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                for (key, point) in points.iter_mut().enumerate() {
                    point.x = (point.x + 3.0) % 4096.0;
                    ranges[key] = grid.relocate(key, ranges[key], *point, RADIUS);
                }
                black_box(grid.occupied_cells())
            });
        });
    }

    group.finish();
}

/// Candidate gathering for every collider.
fn bench_query(c: &mut Criterion) {
    let points = scatter(10_000);
    let (grid, ranges) = populate(&points);

    c.bench_function("grid_query_10k", |b| {
        let mut out = BTreeSet::new();
        b.iter(|| {
            let mut total = 0;
            for (key, range) in ranges.iter().enumerate() {
                out.clear();
                grid.query_into(*range, key, &mut out);
                total += out.len();
            }
            black_box(total)
        });
    });
}

criterion_group!(benches, bench_relocate, bench_query);
criterion_main!(benches);
