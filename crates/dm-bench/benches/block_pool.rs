//! Criterion micro-benchmarks for block pool construction and allocation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use dm_tensor::BlockPool;

fn bench_create(c: &mut Criterion) {
    c.bench_function("pool_create_4k_x_256", |b| {
        b.iter(|| BlockPool::new(black_box(4096), black_box(256)).unwrap());
    });
}

fn bench_drain(c: &mut Criterion) {
    c.bench_function("pool_drain_1024", |b| {
        b.iter_batched(
            || BlockPool::new(64, 1024).unwrap(),
            |pool| {
                while let Some(h) = pool.allocate() {
                    black_box(h);
                }
                pool
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_create, bench_drain);
criterion_main!(benches);
