//! Criterion benchmarks for the synchronous import stages.
//!
//! - header check + row parsing (`parse_products`)
//! - column assembly (`to_batch`)

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use inventory_import::batch::to_batch;
use inventory_import::ingestion::{RowErrorPolicy, parse_products};

const HEADER: &str =
    "UID,Name,Category,Quantity,Unit,ProductionDate,ShelfLifeDays,StorageRequirements";

/// Every 50th row is malformed so the diagnostic path is exercised too.
fn generate_csv(rows: usize) -> String {
    let mut out = String::with_capacity(rows * 64);
    out.push_str(HEADER);
    out.push('\n');
    for i in 0..rows {
        if i % 50 == 49 {
            out.push_str("bad,row,only,three\n");
        } else {
            out.push_str(&format!(
                "INV-{i:06},Item {i},Produce,{},kg,2024-01-{:02},{},Dry\n",
                i % 500,
                i % 28 + 1,
                i % 60
            ));
        }
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_products");
    for rows in [100usize, 1_000, 10_000] {
        let text = generate_csv(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &text, |b, text| {
            b.iter(|| parse_products(black_box(text), RowErrorPolicy::Collect));
        });
    }
    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_batch");
    for rows in [100usize, 10_000] {
        let records = match parse_products(&generate_csv(rows), RowErrorPolicy::Skip) {
            Ok(parsed) => parsed.records,
            Err(e) => panic!("generated csv failed to parse: {e}"),
        };
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &records, |b, records| {
            b.iter(|| to_batch(black_box(records)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_assemble);
criterion_main!(benches);
