//! Error budget behaviour in the runner.

use crate::common::*;

fn broken_fixtures(fx: &FixtureDir, count: usize) {
    for i in 0..count {
        fx.write(&format!("f{:02}.go", i), ScriptedDriver::CRASH);
    }
}

#[test]
fn stops_after_three_parse_failures() {
    let fx = FixtureDir::new();
    broken_fixtures(&fx, 6);

    let report = run_stage(fx.suite(), Stage::Native);
    assert!(report.budget_exhausted);
    assert_eq!(report.parse_failures, 3);
    assert_eq!(report.count(FixtureOutcome::is_failure), 3);
    assert_eq!(report.count(|o| *o == FixtureOutcome::Skipped), 3);
    assert!(matches!(failures(&report, "f00")[0], Failure::ParseFailed(_)));
    assert_eq!(report.outcome("f05"), Some(&FixtureOutcome::Skipped));
}

#[test]
fn no_new_parses_after_exhaustion() {
    let fx = FixtureDir::new();
    broken_fixtures(&fx, 5);
    let driver = ScriptedDriver::json();
    let stats = driver.stats();
    let suite = fx.suite().with_driver(move || driver.clone());

    run_stage(suite, Stage::Native);
    assert_eq!(stats.parses(), 3);
}

#[test]
fn each_stage_group_has_its_own_budget() {
    let fx = FixtureDir::new();
    broken_fixtures(&fx, 4);

    let report = run(fx.suite());
    for stage in &report.stages {
        assert_eq!(stage.parse_failures, 3);
        assert!(stage.budget_exhausted);
    }
}

#[test]
fn custom_ceiling() {
    let fx = FixtureDir::new();
    broken_fixtures(&fx, 4);

    let report = run_stage(fx.suite().with_max_parse_errors(1), Stage::Native);
    assert_eq!(report.count(|o| *o == FixtureOutcome::Skipped), 3);
}

#[test]
fn syntax_error_fixtures_do_not_consume_budget() {
    let fx = FixtureDir::new();
    for i in 0..5 {
        fx.write(&format!("bad{}_syntax_error.go", i), "func {");
    }
    fx.write("ok.go", "{}");

    let report = run_stage(fx.suite(), Stage::Semantic);
    assert_eq!(report.parse_failures, 0);
    assert!(!report.budget_exhausted);
    assert_eq!(report.outcome("ok"), Some(&FixtureOutcome::Generated));
}

#[test]
fn failures_below_ceiling_do_not_skip() {
    let fx = FixtureDir::new();
    broken_fixtures(&fx, 2);
    fx.write("z.go", "{}");

    let report = run_stage(fx.suite(), Stage::Native);
    assert!(!report.budget_exhausted);
    assert_eq!(report.outcome("z"), Some(&FixtureOutcome::Generated));
}
