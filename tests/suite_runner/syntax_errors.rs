//! Classification of syntax-error fixtures.

use crate::common::*;
use std::time::Duration;

#[test]
fn input_error_is_expected() {
    let fx = FixtureDir::new();
    fx.write("broken_syntax_error.go", "func main() {");

    let report = run(fx.suite());
    report.assert_passed();
    for stage in &report.stages {
        assert_eq!(
            stage.outcome("broken_syntax_error"),
            Some(&FixtureOutcome::ExpectedSyntaxError)
        );
    }
    // no goldens for this class
    assert!(!fx.exists("broken_syntax_error.go.native"));
    assert!(!fx.exists("broken_syntax_error.go.sem.uast"));
}

#[test]
fn success_is_a_failure() {
    let fx = FixtureDir::new();
    fx.write("fine_syntax_error.go", "{}");

    let report = run_stage(fx.suite(), Stage::Native);
    assert_eq!(
        failures(&report, "fine_syntax_error"),
        &[Failure::UnexpectedSuccess]
    );
}

#[test]
fn driver_failure_is_a_failure() {
    let fx = FixtureDir::new();
    fx.write("crash_syntax_error.go", ScriptedDriver::CRASH);

    let report = run_stage(fx.suite(), Stage::Annotated);
    assert!(matches!(
        failures(&report, "crash_syntax_error")[0],
        Failure::DriverFailureOnSyntaxError(_)
    ));
}

#[test]
fn timeout_is_a_driver_failure() {
    let fx = FixtureDir::new();
    fx.write("slow_syntax_error.go", ScriptedDriver::HANG);

    let suite = fx.suite().with_parse_timeout(Duration::from_millis(50));
    let report = run_stage(suite, Stage::Native);
    assert!(matches!(
        failures(&report, "slow_syntax_error")[0],
        Failure::DriverFailureOnSyntaxError(drivercheck::DriverError::Timeout(_))
    ));
}

#[test]
fn marker_anywhere_in_the_name() {
    let fx = FixtureDir::new();
    fx.write("bench_x_syntax_error_more.go", "not json");

    let report = run_stage(fx.suite(), Stage::Native);
    assert_eq!(
        report.outcome("bench_x_syntax_error_more"),
        Some(&FixtureOutcome::ExpectedSyntaxError)
    );
}
