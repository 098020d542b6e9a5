//! Criterion benchmarks for estimator folds over synthetic traces.
//!
//! Benchmarks the three built-in estimators, a compiled rule program, and
//! the capacity sweep: the hot paths of a benchmark campaign.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fd_core::{evaluate_spec, mistake_sweep, scenarios, ArrivalTrace, DetectorSpec, NullProbe};

fn trace(len: usize) -> ArrivalTrace {
    scenarios::jittered(len, 0.0, 100.0, 25.0, 1).expect("scenario parameters are valid")
}

fn spec(json: &str) -> DetectorSpec {
    serde_json::from_str(json).expect("bench spec must parse")
}

fn bench_builtin_estimators(c: &mut Criterion) {
    let trace = trace(10_000);
    let specs = [
        (
            "accrual",
            spec(r#"{"detector":"accrual","window":100,"phi":1.0,"base_interval":100.0}"#),
        ),
        (
            "chen",
            spec(r#"{"detector":"chen","window":100,"bias":0.0,"base_interval":100.0}"#),
        ),
        (
            "bertier",
            spec(r#"{"detector":"bertier","window":100,"gamma":0.1,"base_interval":100.0}"#),
        ),
    ];

    let mut group = c.benchmark_group("driver/evaluate");
    for (name, detector) in &specs {
        group.bench_with_input(BenchmarkId::from_parameter(name), detector, |b, detector| {
            b.iter(|| evaluate_spec(black_box(&trace), detector, &NullProbe));
        });
    }
    group.finish();
}

fn bench_rule_program(c: &mut Criterion) {
    let trace = trace(10_000);
    let rule = spec(
        r#"{"detector":"rule",
            "program":"Outside: N=100&delta&1; EA: A+object->interval",
            "base_interval":100.0}"#,
    );
    c.bench_function("rule/accrual_equivalent", |b| {
        b.iter(|| evaluate_spec(black_box(&trace), &rule, &NullProbe));
    });
}

fn bench_capacity_sweep(c: &mut Criterion) {
    let trace = trace(2_000);
    let mut group = c.benchmark_group("sweep/chen_capacity");
    for candidates in [4usize, 16, 64] {
        let caps: Vec<String> = (1..=candidates).map(|n| n.to_string()).collect();
        let detector = spec(&format!(
            r#"{{"detector":"chen","window":[{}],"bias":0.0,"base_interval":100.0}}"#,
            caps.join(",")
        ));
        group.bench_with_input(
            BenchmarkId::from_parameter(candidates),
            &detector,
            |b, detector| {
                b.iter(|| mistake_sweep(black_box(&trace), detector));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_builtin_estimators,
    bench_rule_program,
    bench_capacity_sweep
);
criterion_main!(benches);
