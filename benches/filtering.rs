//! Benchmarks for filter evaluation.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xlgrid::auto_filter::FilterEngine;
use xlgrid::{Grid, GridConfig, Spreadsheet};

/// Grid of `rows` data rows x 8 columns with a few repeating values per column.
fn make_grid(rows: usize) -> Grid {
    let mut matrix = vec![(0..8).map(|c| format!("Col{c}")).collect::<Vec<_>>()];
    for r in 0..rows {
        matrix.push((0..8).map(|c| format!("v{}", (r * (c + 1)) % 17)).collect());
    }
    Grid::from_rows(matrix, GridConfig::default()).expect("valid matrix")
}

/// Full scan with two restricted columns.
fn bench_visible_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_rows");

    for rows in [1_000usize, 10_000, 100_000] {
        let grid = make_grid(rows);
        let mut engine = FilterEngine::from_grid(&grid);
        engine.toggle_filter_value(0, "v3").expect("column 0");
        engine.toggle_filter_value(5, "v11").expect("column 5");

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("scan", rows), &grid, |b, grid| {
            b.iter(|| engine.visible_rows(black_box(grid)))
        });
    }

    group.finish();
}

/// Repeated reads with no mutation in between hit the session cache.
fn bench_cached_reads(c: &mut Criterion) {
    let mut sheet = Spreadsheet::new(make_grid(100_000));
    sheet.toggle_filter_value(2, "v4").expect("column 2");
    let _ = sheet.visible_rows();

    c.bench_function("visible_rows_cached_100000", |b| {
        b.iter(|| black_box(sheet.visible_rows()))
    });
}

/// Distinct values for one column, as built for a dropdown.
fn bench_distinct_values(c: &mut Criterion) {
    let grid = make_grid(100_000);

    c.bench_function("distinct_values_100000", |b| {
        b.iter(|| xlgrid::auto_filter::distinct_values(black_box(&grid), 3).expect("column 3"))
    });
}

criterion_group!(
    benches,
    bench_visible_rows,
    bench_cached_reads,
    bench_distinct_values,
);

criterion_main!(benches);
