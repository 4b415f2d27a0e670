use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use compr::{all_items, parse_with, Registry};
use serde_json::{json, Map, Value};

fn create_kwargs(count: usize) -> Vec<(String, Value)> {
    (0..count)
        .map(|i| match i % 4 {
            0 => (format!("field{i}_lt"), json!(1000)),
            1 => (format!("field{i}_within"), json!([0, 1000])),
            2 => (format!("field{i}_startswith"), json!("value")),
            _ => (format!("field{i}"), json!(i)),
        })
        .collect()
}

fn create_container(count: usize) -> Map<String, Value> {
    (0..count)
        .map(|i| {
            let value = match i % 4 {
                0 | 1 => json!(i),
                2 => json!(format!("value-{i}")),
                _ => json!(i),
            };
            (format!("field{i}"), value)
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_kwargs");
    let registry = Registry::with_builtins();

    for count in [1, 10, 100].iter() {
        let kwargs = create_kwargs(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("builtins", count), count, |b, _| {
            b.iter(|| parse_with(black_box(&registry), black_box(kwargs.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_all_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_items");
    let registry = Registry::with_builtins();

    for count in [1, 10, 100].iter() {
        let pairs = parse_with(&registry, create_kwargs(*count)).unwrap();
        let container = create_container(*count);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("all_match", count), count, |b, _| {
            b.iter(|| all_items(black_box(&container), black_box(&pairs)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_all_items);
criterion_main!(benches);
