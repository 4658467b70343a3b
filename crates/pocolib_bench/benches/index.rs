//! Trigram index benchmarks.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use pocolib_bench::{generate_books, index_books};
use pocolib_core::{shingles, LineCodec, NGramIndex};

/// Benchmark building an index from scratch.
fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for count in [100, 1_000, 10_000].iter() {
        let books = generate_books(*count);
        let projections: Vec<(String, String)> = books
            .iter()
            .map(|b| (b.searchable_projection(), b.key()))
            .collect();

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &projections, |b, items| {
            b.iter(|| {
                let mut index = NGramIndex::new();
                for (projection, key) in items {
                    index.add(black_box(projection), key.clone());
                }
                black_box(index);
            });
        });
    }

    group.finish();
}

/// Benchmark removing one item by full scan and by its projection.
fn bench_index_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_remove");

    for count in [1_000, 10_000].iter() {
        let books = generate_books(*count);
        let index = index_books(&books);
        let target = &books[count / 2];
        let projection = target.searchable_projection();
        let key = target.key();

        group.bench_with_input(BenchmarkId::new("scan", count), &index, |b, index| {
            b.iter_batched(
                || index.clone(),
                |mut index| black_box(index.remove(&key)),
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("fast", count), &index, |b, index| {
            b.iter_batched(
                || index.clone(),
                |mut index| {
                    index.fast_remove(&projection, &key);
                    black_box(index)
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Benchmark shingling projections of growing length.
fn bench_shingles(c: &mut Criterion) {
    let mut group = c.benchmark_group("shingles");

    for len in [8, 64, 512].iter() {
        let text: String = "poco library ".chars().cycle().take(*len).collect();
        group.throughput(Throughput::Bytes(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| black_box(shingles(black_box(text))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_index_build, bench_index_remove, bench_shingles);

criterion_main!(benches);
