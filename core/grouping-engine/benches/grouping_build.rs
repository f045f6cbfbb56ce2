//! FILENAME: core/grouping-engine/benches/grouping_build.rs
//! Benchmarks for full rebuilds and incremental expand/collapse.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grouping_engine::{build, collapse, expand, BuildOptions, FieldKey, GroupingConfig, GroupingCoordinator};
use row_store::{DataRow, GridStore, Record};

/// Rows pre-sorted by region, then city, as a host would deliver them.
fn sorted_rows(count: usize) -> Vec<DataRow> {
    (0..count)
        .map(|i| {
            DataRow::new()
                .with("region", format!("R{:02}", i * 10 / count))
                .with("city", format!("C{:03}", i * 200 / count))
                .with("v", i as f64)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let keys = [FieldKey::new("region"), FieldKey::new("city")];
    let options = BuildOptions::default();
    let mut group = c.benchmark_group("build");

    for count in [1_000, 10_000, 100_000] {
        let rows = sorted_rows(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &rows, |b, rows| {
            b.iter(|| build(black_box(rows.clone()), &keys, &options))
        });
    }
    group.finish();
}

fn bench_toggle(c: &mut Criterion) {
    let keys = [FieldKey::new("region"), FieldKey::new("city")];
    let grouped = build(sorted_rows(10_000), &keys, &BuildOptions::default());
    let all: Vec<usize> = (0..grouped.records.len()).collect();

    c.bench_function("collapse_top_level", |b| {
        b.iter(|| collapse(black_box(0), &grouped.records, None))
    });
    c.bench_function("expand_top_level", |b| {
        b.iter(|| expand(black_box(0), &grouped.records, &all))
    });

    c.bench_function("coordinator_toggle_round_trip", |b| {
        let rows = sorted_rows(10_000).into_iter().map(Record::Data).collect();
        let mut store = GridStore::with_records(rows);
        let mut coordinator = GroupingCoordinator::new();
        coordinator.apply_grouping(&mut store, GroupingConfig::new(["region", "city"]));

        b.iter(|| {
            coordinator.on_expand_toggle(&mut store, black_box(0));
            coordinator.on_expand_toggle(&mut store, black_box(0));
        })
    });
}

criterion_group!(benches, bench_build, bench_toggle);
criterion_main!(benches);
