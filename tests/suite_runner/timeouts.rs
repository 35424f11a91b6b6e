//! Bounded parses.

use crate::common::*;
use std::time::{Duration, Instant};

#[test]
fn hanging_parse_fails_the_fixture_and_the_run_continues() {
    let fx = FixtureDir::new();
    fx.write("a_slow.go", ScriptedDriver::HANG);
    fx.write("b_fine.go", "{}");

    let suite = fx.suite().with_parse_timeout(Duration::from_millis(100));
    let started = Instant::now();
    let report = run_stage(suite, Stage::Native);
    assert!(started.elapsed() < Duration::from_secs(10));

    assert!(matches!(
        failures(&report, "a_slow")[0],
        Failure::ParseFailed(drivercheck::DriverError::Timeout(_))
    ));
    assert_eq!(report.parse_failures, 1);
    assert_eq!(report.outcome("b_fine"), Some(&FixtureOutcome::Generated));
}

#[test]
fn stuck_driver_exhausts_the_budget_without_hanging() {
    let fx = FixtureDir::new();
    fx.write("a.go", ScriptedDriver::STUCK);
    for name in ["b.go", "c.go", "d.go", "e.go"] {
        fx.write(name, "{}");
    }

    let suite = fx.suite().with_parse_timeout(Duration::from_millis(50));
    let started = Instant::now();
    let report = run_stage(suite, Stage::Native);
    assert!(started.elapsed() < Duration::from_secs(5));

    // the stuck driver holds the session, so the next parses time out too
    assert!(report.budget_exhausted);
    assert!(report.count(|o| *o == FixtureOutcome::Skipped) >= 1);
}
