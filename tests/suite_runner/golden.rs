//! Golden artifact workflow through the full runner.

use crate::common::*;

#[test]
fn first_run_generates_every_golden() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);

    let report = run(fx.suite());
    assert!(report.is_success(), "{}", report.summary());
    for stage in Stage::all() {
        assert_eq!(
            report.stage(stage).and_then(|s| s.outcome("hello")),
            Some(&FixtureOutcome::Generated)
        );
    }
    assert!(fx.exists("hello.go.native"));
    assert!(fx.exists("hello.go.uast"));
    assert!(fx.exists("hello.go.sem.uast"));
    assert!(fx.read("hello.go.sem.uast").ends_with('\n'));
}

#[test]
fn second_run_passes() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);
    run(fx.suite());

    let report = run(fx.suite());
    report.assert_passed();
    for stage in Stage::all() {
        assert_eq!(
            report.stage(stage).and_then(|s| s.outcome("hello")),
            Some(&FixtureOutcome::Passed)
        );
    }
}

#[test]
fn mismatch_keeps_golden_and_writes_pending() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);
    run(fx.suite());
    let golden = fx.read("hello.go.native");

    fx.write("hello.go", r#"{"@type": "go:File"}"#);
    let report = run_stage(fx.suite(), Stage::Native);

    assert!(!report.is_success());
    assert_eq!(fx.read("hello.go.native"), golden);
    assert!(fx.exists("hello.go.native_got"));
    match &failures(&report, "hello")[0] {
        Failure::GoldenMismatch { diff, .. } => {
            assert!(diff.starts_with("diff -d "));
            assert!(diff.contains("hello.go.native_got"));
        }
        other => panic!("unexpected failure {:?}", other),
    }
}

#[test]
fn resolved_mismatch_removes_pending() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);
    run(fx.suite());

    fx.write("hello.go", "[]");
    run_stage(fx.suite(), Stage::Native);
    assert!(fx.exists("hello.go.native_got"));

    fx.write("hello.go", FILE);
    let report = run_stage(fx.suite(), Stage::Native);
    assert_eq!(report.outcome("hello"), Some(&FixtureOutcome::Passed));
    assert!(!fx.exists("hello.go.native_got"));
}

#[test]
fn update_native_only_touches_native_goldens() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);
    run(fx.suite());
    let semantic = fx.read("hello.go.sem.uast");

    fx.write("hello.go", r#"{"@type": "go:File", "Decls": []}"#);
    let report = run(fx.suite().update_native(true));

    let native = report.stage(Stage::Native).unwrap();
    assert_eq!(native.outcome("hello"), Some(&FixtureOutcome::Updated));
    assert!(!fx.exists("hello.go.native_got"));
    assert!(fx.read("hello.go.native").contains("Decls"));

    let sem = report.stage(Stage::Semantic).unwrap();
    assert!(sem.outcome("hello").unwrap().is_failure());
    assert_eq!(fx.read("hello.go.sem.uast"), semantic);
    assert!(fx.exists("hello.go.sem.uast_got"));
}

#[test]
fn update_uast_updates_annotated_and_semantic() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);
    run(fx.suite());
    fx.write("hello.go", r#"{"@type": "go:File", "Decls": []}"#);
    run(fx.suite());
    assert!(fx.exists("hello.go.uast_got"));

    let report = run(fx.suite().update_native(true).update_uast(true));
    report.assert_passed();
    assert_eq!(
        report.stage(Stage::Annotated).unwrap().outcome("hello"),
        Some(&FixtureOutcome::Updated)
    );
    assert!(!fx.exists("hello.go.uast_got"));
    assert!(!fx.exists("hello.go.sem.uast_got"));
}

#[test]
fn empty_golden_is_compared_not_regenerated() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);
    fx.write("hello.go.native", "");

    let report = run_stage(fx.suite(), Stage::Native);
    assert!(report.outcome("hello").unwrap().is_failure());
    assert_eq!(fx.read("hello.go.native"), "");
}

#[test]
fn fixtures_run_in_file_name_order() {
    let fx = FixtureDir::new();
    fx.write("b.go", "{}").write("a.go", "{}").write("c.go", "{}");
    fx.write("notes.txt", "ignored");

    let report = run_stage(fx.suite(), Stage::Native);
    let names: Vec<_> = report.fixtures.iter().map(|r| r.fixture.name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
