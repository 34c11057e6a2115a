//! # Odd-Even Sort Benchmark
//!
//! Compares the sequential baselines, the barrier pool (spin and blocking),
//! the channel farm and the rayon parallel-for on the same random input.
//!
//! Run with: `cargo bench --package oddeven_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oddeven_core::{
    random_values, sequential, Coordinator, FarmSorter, ParallelForSorter, SortConfig,
    WaitStrategy,
};

const LENGTH: usize = 20_000;
const SEED: u64 = 1;
const MAX_VALUE: i16 = 10_000;

fn bench_sequential(c: &mut Criterion) {
    let values = random_values(SEED, LENGTH, MAX_VALUE).unwrap();
    c.bench_function("sequential_20k", |b| {
        b.iter(|| {
            let mut work = values.clone();
            black_box(sequential::sort(&mut work))
        });
    });
    c.bench_function("sequential_split_20k", |b| {
        b.iter(|| {
            let mut work = values.clone();
            black_box(sequential::sort_split(&mut work))
        });
    });
}

fn bench_barrier_pool(c: &mut Criterion) {
    let values = random_values(SEED, LENGTH, MAX_VALUE).unwrap();
    let mut group = c.benchmark_group("barrier_pool");
    group.sample_size(10);

    for workers in [1, 2, 4, 8] {
        for strategy in [WaitStrategy::Spin, WaitStrategy::Blocking] {
            let config = SortConfig::new(SEED, LENGTH, workers, 64).with_wait_strategy(strategy);
            let coordinator = Coordinator::new(config).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), workers),
                &values,
                |b, values| b.iter(|| black_box(coordinator.sort_values(values).unwrap())),
            );
        }
    }
    group.finish();
}

fn bench_farm(c: &mut Criterion) {
    let values = random_values(SEED, LENGTH, MAX_VALUE).unwrap();
    let mut group = c.benchmark_group("farm");
    group.sample_size(10);

    for workers in [2, 4, 8] {
        let farm = FarmSorter::new(SortConfig::new(SEED, LENGTH, workers, 64)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &values, |b, values| {
            b.iter(|| black_box(farm.sort_values(values).unwrap()));
        });
    }
    group.finish();
}

fn bench_parallel_for(c: &mut Criterion) {
    let values = random_values(SEED, LENGTH, MAX_VALUE).unwrap();
    let mut group = c.benchmark_group("parallel_for");
    group.sample_size(10);

    for (workers, grain) in [(2, 1), (4, 1), (4, 256), (8, 256)] {
        let config = SortConfig::new(SEED, LENGTH, workers, 64).with_grain(grain);
        let sorter = ParallelForSorter::new(config).unwrap();
        group.bench_with_input(
            BenchmarkId::new(format!("grain_{grain}"), workers),
            &values,
            |b, values| b.iter(|| black_box(sorter.sort_values(values).unwrap())),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential,
    bench_barrier_pool,
    bench_farm,
    bench_parallel_for
);
criterion_main!(benches);
