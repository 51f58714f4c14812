//! Benchmark for rule parsing and evaluation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rule_engine_core::{combine_all, create_rule, create_rule_from_json, evaluate_rule, DataRecord};
use serde_json::json;

/// A realistic eligibility rule with mixed connectives
const RULE: &str = "age > 30 AND department = 'Sales' OR salary > 50000 AND experience > 5";

fn sample_record() -> DataRecord {
    DataRecord::new()
        .with("age", 35)
        .with("department", "Sales")
        .with("salary", 60000)
        .with("experience", 7)
}

fn benchmark_parse(c: &mut Criterion) {
    c.bench_function("create_rule", |b| {
        b.iter(|| create_rule(black_box(RULE)).unwrap())
    });

    let description = json!({
        "rules": [
            {"operator": "AND", "left": {"operand": "age > 30"}, "right": {"operand": "department = 'Sales'"}},
            {"operator": "OR", "left": {"operand": "salary > 50000"}, "right": {"operand": "experience > 5"}}
        ]
    });
    c.bench_function("create_rule_from_json", |b| {
        b.iter(|| create_rule_from_json(black_box(&description)).unwrap())
    });
}

fn benchmark_evaluate(c: &mut Criterion) {
    let rule = create_rule(RULE).unwrap();
    let record = sample_record();

    c.bench_function("evaluate_rule", |b| {
        b.iter(|| evaluate_rule(black_box(&rule), black_box(&record)).unwrap())
    });

    // 64 leaves folded into one deep tree
    let wide = combine_all(
        (0..64).map(|i| create_rule(&format!("age > {}", i % 40)).unwrap()),
        "OR",
    )
    .unwrap();
    c.bench_function("evaluate_rule_64_leaves", |b| {
        b.iter(|| evaluate_rule(black_box(&wide), black_box(&record)).unwrap())
    });
}

criterion_group!(benches, benchmark_parse, benchmark_evaluate);
criterion_main!(benches);
