//! Line store benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pocolib_bench::generate_lines;
use pocolib_storage::{LineStore, StoreOptions, WriteMode};
use std::fs;
use tempfile::TempDir;

fn populated(temp_dir: &TempDir, count: usize, sync: bool) -> LineStore {
    let path = temp_dir.path().join("bench.db");
    let mut content = generate_lines(count, 80).join("\n");
    content.push('\n');
    fs::write(&path, content).unwrap();
    LineStore::open_with_options(&path, StoreOptions::new().sync_on_write(sync)).unwrap()
}

/// Benchmark appending a line, which rewrites the whole file.
fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_append");
    group.sample_size(20);

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            let mut store = populated(&temp_dir, count, false);

            b.iter(|| {
                store.append_line(black_box("appended line")).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark replacing a line with and without fsync.
fn bench_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_replace");
    group.sample_size(20);

    for sync in [false, true] {
        let label = if sync { "synced" } else { "unsynced" };
        group.bench_function(BenchmarkId::new(label, 1_000), |b| {
            let temp_dir = TempDir::new().unwrap();
            let mut store = populated(&temp_dir, 1_000, sync);
            let mut i = 0;

            b.iter(|| {
                store
                    .write_line(black_box(i % 1_000), "replaced line", WriteMode::Replace)
                    .unwrap();
                i += 7;
            });
        });
    }

    group.finish();
}

/// Benchmark cached hashing against re-reading the file.
fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_hash");

    for count in [1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("cached", count), count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            let mut store = populated(&temp_dir, count, false);
            b.iter(|| black_box(store.hash()));
        });

        group.bench_with_input(BenchmarkId::new("forced", count), count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            let mut store = populated(&temp_dir, count, false);
            b.iter(|| black_box(store.force_hash()));
        });
    }

    group.finish();
}

/// Benchmark reads served from the cache.
fn bench_read(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let mut store = populated(&temp_dir, 1_000, false);
    let mut i = 0;

    c.bench_function("store_read_line", |b| {
        b.iter(|| {
            let line = store.read_line(black_box((i * 7) % 1_000)).map(str::len);
            i += 1;
            black_box(line)
        });
    });
}

criterion_group!(benches, bench_append, bench_replace, bench_hash, bench_read);

criterion_main!(benches);
