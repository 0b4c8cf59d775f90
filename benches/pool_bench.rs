use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_utils::sync::WaitGroup;
use growpool::{DynamicThreadPool, PoolConfig};

const JOBS: usize = 1000;

fn run_jobs(pool: &DynamicThreadPool, counter: &Arc<AtomicUsize>) {
    let wg = WaitGroup::new();
    for _ in 0..JOBS {
        let counter = Arc::clone(counter);
        let wg = wg.clone();
        pool.spawn(move || {
            counter.fetch_add(1, Ordering::Relaxed);
            drop(wg);
        })
        .unwrap();
    }
    wg.wait();
}

fn submit_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit");

    for max_threads in [1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("warm", max_threads),
            &max_threads,
            |b, &max_threads| {
                let pool = DynamicThreadPool::create(max_threads, max_threads).unwrap();
                let counter = Arc::new(AtomicUsize::new(0));
                b.iter(|| run_jobs(&pool, &counter));
            },
        );
    }

    group.finish();
}

fn lifecycle_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");

    group.bench_function("create_grow_shutdown", |b| {
        b.iter(|| {
            let pool = DynamicThreadPool::with_config(PoolConfig::new(8, 1)).unwrap();
            let counter = Arc::new(AtomicUsize::new(0));
            run_jobs(&pool, &counter);
            pool.shutdown().unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, submit_bench, lifecycle_bench);
criterion_main!(benches);
