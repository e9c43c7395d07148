//! Benchmarks for the urltally temporal index
//!
//! Run with: cargo bench

use chrono::{DateTime, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use urltally::index::{AvlTree, Granularity, TemporalIndex};
use urltally::query::{count_urls, find_top_n};

fn create_records(count: usize) -> Vec<(NaiveDateTime, String)> {
    (0..count)
        .map(|i| {
            let timestamp = DateTime::from_timestamp(1_438_387_200 + i as i64 * 7, 0)
                .unwrap()
                .naive_utc();
            (timestamp, format!("http://example.com/{}", i % 500))
        })
        .collect()
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");

    for size in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("insert_ascending_{}", size), |b| {
            b.iter(|| {
                let mut tree = AvlTree::new();
                for key in 0..size as i64 {
                    tree.insert(black_box(key), ()).unwrap();
                }
                tree
            })
        });
    }

    group.finish();
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("index");
    let records = create_records(10_000);

    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("add_10000", |b| {
        b.iter(|| {
            let mut index = TemporalIndex::new();
            for (timestamp, url) in &records {
                index.add(black_box(timestamp), black_box(url)).unwrap();
            }
            index
        })
    });

    let mut index = TemporalIndex::new();
    for (timestamp, url) in &records {
        index.add(timestamp, url).unwrap();
    }

    group.bench_function("count_day", |b| {
        b.iter(|| count_urls(&index, black_box("2015-08-01"), Granularity::Day).unwrap())
    });

    group.bench_function("top_10_month", |b| {
        b.iter(|| find_top_n(&index, black_box("2015-08"), Granularity::Month, 10).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_tree, bench_index);
criterion_main!(benches);
