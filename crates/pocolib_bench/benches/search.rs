//! Search ranking benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pocolib_bench::{generate_books, index_books, random_phrase, rng};
use pocolib_core::search::{search, tally};
use pocolib_core::{distance, LineCodec};
use std::collections::BTreeMap;

/// Benchmark hit counting against indexes of growing size.
fn bench_tally(c: &mut Criterion) {
    let mut group = c.benchmark_group("tally");

    for count in [1_000, 10_000].iter() {
        let index = index_books(&generate_books(*count));

        for query in ["rust", "advanced programming"] {
            group.bench_with_input(BenchmarkId::new(query, count), &index, |b, index| {
                b.iter(|| black_box(tally(black_box(query), index)));
            });
        }
    }

    group.finish();
}

/// Benchmark full ranking, including the distance tie-breaker.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(50);

    for count in [1_000, 10_000].iter() {
        let books = generate_books(*count);
        let index = index_books(&books);
        let projections: BTreeMap<String, String> = books
            .iter()
            .map(|b| (b.key(), b.searchable_projection()))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &index, |b, index| {
            b.iter(|| {
                let results = search(black_box("practical rust"), index, |key| {
                    projections.get(key).cloned().unwrap_or_default()
                });
                black_box(results)
            });
        });
    }

    group.finish();
}

/// Benchmark edit distance on strings of growing length.
fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");
    let mut rng = rng();

    for words in [1, 4, 16].iter() {
        let a = random_phrase(&mut rng, *words);
        let b_text = random_phrase(&mut rng, *words);
        group.bench_with_input(
            BenchmarkId::from_parameter(a.len()),
            &(a, b_text),
            |b, (left, right)| {
                b.iter(|| black_box(distance(black_box(left), black_box(right))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_tally, bench_search, bench_distance);

criterion_main!(benches);
