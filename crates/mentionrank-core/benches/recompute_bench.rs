//! # Recompute Benchmarks
//!
//! Performance benchmarks for the mention pass and the ordering.
//!
//! Run with: `cargo bench -p mentionrank-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mentionrank_core::{Event, EventId, Kind, RankingEngine, Tag, order_by_rank};
use std::hint::black_box;

/// Each event references the previous one and the first one.
fn create_chain_engine(size: usize) -> RankingEngine {
    let engine = RankingEngine::new();
    for i in 0..size {
        let mut tags = vec![Tag::reference(&EventId::new("n0"))];
        if i > 0 {
            tags.push(Tag::reference(&EventId::new(format!("n{}", i - 1))));
        }
        engine.ingest(Event::new(format!("n{i}"), Kind::TEXT_NOTE, tags));
    }
    engine
}

/// Every event references an event that is never ingested.
fn create_dangling_engine(size: usize) -> RankingEngine {
    let engine = RankingEngine::new();
    for i in 0..size {
        let tags = vec![Tag::reference(&EventId::new(format!("missing{}", i % 64)))];
        engine.ingest(Event::new(format!("n{i}"), Kind::TEXT_NOTE, tags));
    }
    engine
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(create_chain_engine(size)));
        });
    }

    group.finish();
}

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute");

    for size in [100, 1000, 10000].iter() {
        let engine = create_chain_engine(*size);

        group.bench_with_input(BenchmarkId::new("chain", size), size, |b, _| {
            b.iter(|| black_box(engine.recompute()));
        });

        let engine = create_dangling_engine(*size);

        group.bench_with_input(BenchmarkId::new("dangling", size), size, |b, _| {
            b.iter(|| black_box(engine.recompute()));
        });
    }

    group.finish();
}

fn bench_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_by_rank");

    for size in [100, 1000, 10000].iter() {
        let engine = create_chain_engine(*size);
        engine.recompute();
        let records: Vec<_> = engine.get_all().into_values().collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(order_by_rank(records.clone())));
        });
    }

    group.finish();
}

fn bench_snapshot_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_bytes");

    for size in [100, 1000].iter() {
        let engine = create_chain_engine(*size);
        engine.recompute();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(engine.snapshot_bytes()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ingest,
    bench_recompute,
    bench_order,
    bench_snapshot_bytes
);
criterion_main!(benches);
