//! Benchmark for BigList vs standard Vec.
//!
//! Compares positional editing, cloning and bulk operations of BigList
//! against Rust's standard Vec.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lambars_collections::sequence::BigList;
use std::hint::black_box;

// =============================================================================
// push Benchmark
// =============================================================================

fn benchmark_push(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("push");

    for size in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::new("BigList", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut list = BigList::new();
                for index in 0..size {
                    list.push(black_box(index)).unwrap();
                }
                black_box(list)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for index in 0..size {
                    vector.push(black_box(index));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

// =============================================================================
// insert in the middle Benchmark
// =============================================================================

fn benchmark_insert_middle(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert_middle");

    for size in [1000, 10000, 100_000] {
        let list: BigList<i32> = (0..size).collect();
        let vector: Vec<i32> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("BigList", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut list = list.clone();
                for offset in 0..100 {
                    list.insert(list.len() / 2, black_box(offset)).unwrap();
                }
                black_box(list)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut vector = vector.clone();
                for offset in 0..100 {
                    vector.insert(vector.len() / 2, black_box(offset));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [1000, 100_000] {
        let list: BigList<i32> = (0..size).collect();
        let length = list.len();

        group.bench_with_input(BenchmarkId::new("BigList", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut sum = 0_i64;
                for index in (0..length).step_by(97) {
                    sum += i64::from(*list.get(black_box(index)).unwrap());
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// clone-then-mutate Benchmark
// =============================================================================

fn benchmark_clone_and_set(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("clone_and_set");

    for size in [10000, 1_000_000] {
        let list: BigList<i32> = (0..size).collect();
        let vector: Vec<i32> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("BigList", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut copy = list.clone();
                copy.set(copy.len() / 3, black_box(-1)).unwrap();
                black_box(copy)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut copy = vector.clone();
                let index = copy.len() / 3;
                copy[index] = black_box(-1);
                black_box(copy)
            });
        });
    }

    group.finish();
}

// =============================================================================
// concat / get_range Benchmark
// =============================================================================

fn benchmark_bulk(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("bulk");
    let list: BigList<i32> = (0..1_000_000).collect();

    group.bench_function("concat_self", |bencher| {
        bencher.iter(|| black_box(list.concat(black_box(&list)).unwrap()));
    });

    group.bench_function("get_range", |bencher| {
        bencher.iter(|| black_box(list.get_range(black_box(123_456), 500_000).unwrap()));
    });

    group.bench_function("repeat_list", |bencher| {
        let template: BigList<i32> = (0..100).collect();
        bencher.iter(|| black_box(BigList::repeat_list(&template, black_box(1_000_000)).unwrap()));
    });

    group.finish();
}

// =============================================================================
// iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");
    let list: BigList<i64> = (0..100_000).collect();

    group.bench_function("iter", |bencher| {
        bencher.iter(|| black_box(list.iter().sum::<i64>()));
    });

    group.bench_function("versioned_iter", |bencher| {
        bencher.iter(|| {
            let mut cursor = list.versioned_iter();
            let mut sum = 0;
            while let Some(element) = cursor.next_element(&list).unwrap() {
                sum += element;
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_push,
    benchmark_insert_middle,
    benchmark_get,
    benchmark_clone_and_set,
    benchmark_bulk,
    benchmark_iteration
);
criterion_main!(benches);
