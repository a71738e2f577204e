//! Read-path benchmarks for swapwatch.
//!
//! Measures:
//! - Content read latency
//! - Content + metadata read latency
//! - Scaling with concurrent readers
//! - Reload cost for unchanged and changed content

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, SystemTime};
use swapwatch::core::{Snapshot, SnapshotStore};
use swapwatch::prelude::*;
use tempfile::TempDir;

const PAYLOAD: &[u8] = &[b'x'; 4096];

fn build_watcher(runtime: &tokio::runtime::Runtime) -> (TempDir, FileWatcher) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("payload");
    std::fs::write(&path, PAYLOAD).unwrap();
    let watcher = runtime.block_on(FileWatcher::new(&path)).unwrap();
    (temp_dir, watcher)
}

/// Benchmark single-threaded read latency
fn benchmark_read_latency(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (_dir, watcher) = build_watcher(&runtime);

    let mut group = c.benchmark_group("read_latency");
    group.bench_function("get", |b| {
        b.iter(|| {
            let content = watcher.get();
            black_box(content.len());
        });
    });
    group.bench_function("get_with_metadata", |b| {
        b.iter(|| {
            let (content, info) = watcher.get_with_metadata();
            black_box((content.len(), info.size()));
        });
    });
    group.finish();
}

/// Benchmark concurrent reads with varying thread counts
fn benchmark_concurrent_reads(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (_dir, watcher) = build_watcher(&runtime);
    let mut group = c.benchmark_group("concurrent_reads");

    for num_threads in [1, 2, 4, 8] {
        group.throughput(Throughput::Elements(num_threads as u64 * 1000));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_threads", num_threads)),
            &num_threads,
            |b, &num_threads| {
                let barrier = Arc::new(Barrier::new(num_threads + 1));

                b.iter_custom(|iters| {
                    let mut handles = vec![];

                    for _ in 0..num_threads {
                        let watcher = watcher.clone();
                        let barrier = Arc::clone(&barrier);

                        handles.push(thread::spawn(move || {
                            barrier.wait();

                            let start = std::time::Instant::now();
                            for _ in 0..iters {
                                black_box(watcher.get().len());
                            }
                            start.elapsed()
                        }));
                    }

                    barrier.wait();

                    let total: Duration = handles.into_iter().map(|h| h.join().unwrap()).sum();
                    total / num_threads as u32
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the snapshot swap alone
fn benchmark_snapshot_replace(c: &mut Criterion) {
    let store = SnapshotStore::new(Snapshot::new(PAYLOAD, SystemTime::now()));

    let mut group = c.benchmark_group("snapshot_replace");
    group.bench_function("unchanged_4k", |b| {
        b.iter(|| black_box(store.replace(Snapshot::new(PAYLOAD, SystemTime::now()))));
    });
    group.finish();
}

/// Benchmark a full reload (read + stat + compare)
fn benchmark_reload(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (_dir, watcher) = build_watcher(&runtime);

    let mut group = c.benchmark_group("reload");
    group.bench_function("unchanged_4k", |b| {
        b.iter(|| {
            let changed = runtime.block_on(watcher.reload()).unwrap();
            black_box(changed);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_read_latency,
    benchmark_concurrent_reads,
    benchmark_snapshot_replace,
    benchmark_reload,
);

criterion_main!(benches);
