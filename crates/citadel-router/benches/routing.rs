//! Routing benchmarks.
//!
//! Run with: `cargo bench -p citadel-router`

use citadel_router::{Route, RouteTable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;

fn build_table(num_routes: usize) -> RouteTable {
    let mut table = RouteTable::new();

    for i in 0..num_routes / 3 {
        table
            .register(Method::GET, &format!("/forums/board{i}"), Route::payload(format!("board{i}")))
            .unwrap();
    }

    for i in 0..num_routes / 3 {
        table
            .register(
                Method::GET,
                &format!("/forums/board{i}/:thread"),
                Route::payload(format!("thread{i}")),
            )
            .unwrap();
    }

    for i in 0..num_routes / 3 {
        table
            .register(
                Method::GET,
                &format!("/games/:game/layer{i}/:hex"),
                Route::payload(format!("hex{i}")),
            )
            .unwrap();
    }

    table
}

fn bench_literal_match(c: &mut Criterion) {
    let table = build_table(99);

    c.bench_function("literal_match", |b| {
        b.iter(|| black_box(table.resolve(&Method::GET, "/forums/board20")));
    });
}

fn bench_capture_match(c: &mut Criterion) {
    let table = build_table(99);

    c.bench_function("capture_match", |b| {
        b.iter(|| black_box(table.resolve(&Method::GET, "/forums/board12/4711")));
    });
}

fn bench_nested_capture_match(c: &mut Criterion) {
    let table = build_table(99);

    c.bench_function("nested_capture_match", |b| {
        b.iter(|| black_box(table.resolve(&Method::GET, "/games/ardennes/layer30/c7")));
    });
}

fn bench_miss(c: &mut Criterion) {
    let table = build_table(99);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(table.resolve(&Method::GET, "/articles/none/here")));
    });
}

fn bench_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");
    for size in [30, 300, 3000] {
        let table = build_table(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| black_box(table.resolve(&Method::GET, "/games/g/layer5/a1")));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_literal_match,
    bench_capture_match,
    bench_nested_capture_match,
    bench_miss,
    bench_table_size
);
criterion_main!(benches);
