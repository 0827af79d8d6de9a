use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use table_pipeline::config::TableSpec;
use table_pipeline::filter::{FilterNode, PredicateCompiler};
use table_pipeline::pipeline::TablePipeline;
use table_pipeline::registry::{InMemoryServiceRegistry, Service};
use table_pipeline::source::DataSourceRef;
use table_pipeline::types::{ColumnDef, Record};

const ROWS: usize = 10_000;

fn records() -> Vec<Record> {
    (0..ROWS)
        .map(|i| {
            Record::new()
                .with("id", i as i64)
                .with("name", format!("Item {i}"))
                .with("status", if i % 3 == 0 { "inactive" } else { "active" })
                .with("age", (i % 90) as i64)
                .with("score", i as f64 * 0.5)
        })
        .collect()
}

fn filter() -> FilterNode {
    FilterNode::and([
        FilterNode::equals("status", "ACTIVE").ignore_case(),
        FilterNode::range("age", Some(18), Some(65)),
        FilterNode::or([
            FilterNode::contains("name", "7"),
            FilterNode::greater_than("score", 2500.0),
        ]),
        FilterNode::not(FilterNode::one_of("id", [1i64, 2, 3])),
    ])
}

fn benchmark_compile(c: &mut Criterion) {
    let registry = InMemoryServiceRegistry::new();
    let node = filter();

    c.bench_function("compile_filter_tree", |b| {
        b.iter(|| {
            let compiler = PredicateCompiler::new(&registry);
            black_box(compiler.compile(Some(black_box(&node))).unwrap())
        })
    });
}

fn benchmark_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_run");
    group.throughput(Throughput::Elements(ROWS as u64));

    let registry = InMemoryServiceRegistry::new()
        .with_service("people", Service::new().static_data("all", records()));
    let pipeline = TablePipeline::new(Arc::new(registry));
    let columns = vec![ColumnDef::new("id", "ID"), ColumnDef::new("name", "Name")];

    let unfiltered = TableSpec::new(DataSourceRef::new("people", "all"), columns.clone());
    group.bench_function("fetch_and_project", |b| {
        b.iter(|| black_box(pipeline.run(&unfiltered).unwrap()))
    });

    let filtered = unfiltered.clone().with_filter(filter());
    group.bench_function("fetch_filter_project", |b| {
        b.iter(|| black_box(pipeline.run(&filtered).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, benchmark_compile, benchmark_run);
criterion_main!(benches);
