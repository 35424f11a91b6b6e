//! Benchmark runner over a fixture directory.

use crate::common::*;
use drivercheck::{BenchmarkRunner, Node};

fn bench_dir() -> FixtureDir {
    let fx = FixtureDir::new();
    fx.write("big.go", FILE);
    fx.write("bench_small.go", r#"{"@type": "go:File"}"#);
    fx.write("plain.go", "{}");
    fx
}

#[test]
fn transform_benchmark_skipped_without_target() {
    let fx = bench_dir();
    let suite = fx.suite();
    let report = BenchmarkRunner::new(&suite).transform(false).unwrap();
    assert!(report.is_skipped());
}

#[test]
fn transform_iterations_never_see_each_other() {
    let fx = bench_dir();
    let suite = fx.suite().with_bench_name("big");
    let runner = BenchmarkRunner::new(&suite).iterations(50);

    // the scripted pipeline fails on an already transformed tree, so any
    // leak between iterations would surface as an error
    let report = runner.transform(false).unwrap();
    assert_eq!(report.iterations, 50);

    let bench = runner.prepare_transform(false).unwrap().unwrap();
    let first = bench.iterate().unwrap();
    let second = bench.iterate().unwrap();
    assert_eq!(first, second);
    assert!(bench.base().get("@mode").is_none());
}

#[test]
fn legacy_variant() {
    let fx = bench_dir();
    let suite = fx
        .suite()
        .with_bench_name("big")
        .with_legacy_converter(ScriptedLegacyConverter);
    let runner = BenchmarkRunner::new(&suite).iterations(5);

    let report = runner.transform(true).unwrap();
    assert_eq!(report.name, "transform-legacy");
    assert!(!report.is_skipped());

    let out = runner.prepare_transform(true).unwrap().unwrap().iterate().unwrap();
    assert_eq!(out.get("InternalType").and_then(Node::as_str), Some("go:File"));
}

#[test]
fn fixture_benchmarks_cover_bench_prefix_only() {
    let fx = bench_dir();
    let suite = fx.suite();
    let reports = BenchmarkRunner::new(&suite).iterations(3).fixtures().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "fixtures/small");
    assert_eq!(reports[0].iterations, 3);
}

#[test]
fn fixture_benchmark_parse_failure_aborts() {
    let fx = FixtureDir::new();
    fx.write("bench_broken.go", "not json");
    let suite = fx.suite();
    assert!(matches!(
        BenchmarkRunner::new(&suite).fixtures(),
        Err(RunnerError::Parse(_))
    ));
}
