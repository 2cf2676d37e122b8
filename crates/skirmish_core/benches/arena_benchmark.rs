//! # Slot Arena Benchmark
//!
//! Measures add/remove churn and watermark-bounded iteration.
//!
//! Run with: `cargo bench --package skirmish_core --bench arena_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skirmish_core::{EntityId, SlotArena};

/// Fill then drain an arena.
fn bench_add_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena_add_remove");

    for count in [1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut arena: SlotArena<[f32; 4]> = SlotArena::new();
                let slots: Vec<usize> = (0..count)
                    .map(|i| arena.add(EntityId::new(i as u64), [0.0; 4]))
                    .collect();
                for slot in slots {
                    black_box(arena.remove(slot));
                }
                arena.capacity()
            });
        });
    }

    group.finish();
}

/// Bullets spawning and expiring every step: recycled slots, stable capacity.
fn bench_churn(c: &mut Criterion) {
    let mut arena: SlotArena<[f32; 4]> = SlotArena::with_capacity(4_096);
    let mut live: Vec<usize> = (0..2_048)
        .map(|i| arena.add(EntityId::new(i), [0.0; 4]))
        .collect();
    let mut next = 2_048_u64;

    c.bench_function("arena_churn_64_per_step", |b| {
        b.iter(|| {
            for _ in 0..64 {
                let slot = live.remove(0);
                arena.remove(slot);
                live.push(arena.add(EntityId::new(next), [1.0; 4]));
                next += 1;
            }
            black_box(arena.len())
        });
    });
}

/// Iteration over a sparse arena, bounded by the watermark.
fn bench_sparse_iteration(c: &mut Criterion) {
    let mut arena: SlotArena<[f32; 4]> = SlotArena::new();
    let slots: Vec<usize> = (0..100_000)
        .map(|i| arena.add(EntityId::new(i), [1.0; 4]))
        .collect();
    for slot in slots.iter().skip(1).step_by(2) {
        arena.remove(*slot);
    }

    c.bench_function("arena_iterate_half_full_100k", |b| {
        b.iter(|| {
            let mut sum = 0.0_f32;
            for (_, _, value) in arena.iter() {
                sum += value[0];
            }
            black_box(sum)
        });
    });
}

criterion_group!(benches, bench_add_remove, bench_churn, bench_sparse_iteration);
criterion_main!(benches);
