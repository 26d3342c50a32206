use std::fmt::Write;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use chunked_sheet_reader::reader::ChunkedReader;
use chunked_sheet_reader::source::{CsvSource, MemorySource};
use chunked_sheet_reader::types::{ColumnDefinition, ColumnType, Schema};

fn orders_schema() -> Schema {
    Schema::new(vec![
        ColumnDefinition::required("id", ColumnType::Int),
        ColumnDefinition::required("ordered_at", ColumnType::Date),
        ColumnDefinition::required("ship_time", ColumnType::Time),
        ColumnDefinition::optional("status", ColumnType::String),
        ColumnDefinition::required("total", ColumnType::Float),
    ])
}

fn generate_orders(rows: usize) -> String {
    let mut text = String::from("id,ordered_at,ship_time,status,total\n");
    for i in 0..rows {
        let status = match i % 3 {
            0 => "shipped",
            1 => "pending",
            _ => "processing",
        };
        let day = (i % 28) + 1;
        let hour = i % 24;
        let _ = writeln!(
            text,
            "{i},2024-01-{day:02},2024-01-{day:02} {hour:02}:00:00,{status},{}.{:02}",
            i * 3,
            i % 100
        );
    }
    text
}

fn drain_csv(c: &mut Criterion) {
    let data = generate_orders(20_000);
    let mut group = c.benchmark_group("drain_csv");
    group.sample_size(10);
    for step in [256usize, 1024, 8192] {
        group.bench_with_input(BenchmarkId::from_parameter(step), &step, |b, &step| {
            b.iter(|| {
                let source = CsvSource::from_bytes(data.as_bytes());
                let mut reader = ChunkedReader::new(source, orders_schema());
                let batches = reader.drain(step).unwrap();
                assert!(batches.iter().all(|batch| batch.warn.is_empty()));
            })
        });
    }
    group.finish();
}

fn validate_memory(c: &mut Criterion) {
    let data = generate_orders(20_000);
    let rows: Vec<Vec<&str>> = data.lines().map(|l| l.split(',').collect()).collect();
    let source = MemorySource::from_text_rows(rows);
    c.bench_function("validate_memory_1024", |b| {
        b.iter(|| {
            let mut reader = ChunkedReader::new(source.clone(), orders_schema());
            reader.drain(1024).unwrap()
        })
    });
}

criterion_group!(benches, drain_csv, validate_memory);
criterion_main!(benches);
