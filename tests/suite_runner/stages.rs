//! Per-stage validation through the runner.

use crate::common::*;

const CALLS: &str = r#"{
  "@type": "go:File",
  "Decls": [
    {"@type": "go:CallExpr", "Fun": {"@type": "go:FuncLit"}},
    {"@type": "go:CallExpr"},
    {"@type": "other:CallExpr"}
  ]
}"#;

#[test]
fn forbidden_types_reported_with_counts_in_order() {
    let fx = FixtureDir::new();
    fx.write("calls.go", CALLS);
    let suite = fx
        .suite()
        .with_forbidden_types(["GoStmt", "FuncLit", "CallExpr"]);

    let report = run_stage(suite, Stage::Semantic);
    assert_eq!(
        failures(&report, "calls"),
        &[
            Failure::ForbiddenType {
                tag: "CallExpr".into(),
                count: 2
            },
            Failure::ForbiddenType {
                tag: "FuncLit".into(),
                count: 1
            },
        ]
    );
}

#[test]
fn forbidden_types_only_checked_at_semantic_stage() {
    let fx = FixtureDir::new();
    fx.write("calls.go", CALLS);
    let suite = fx.suite().with_forbidden_types(["CallExpr"]);

    let report = run(suite);
    assert!(report.stage(Stage::Native).unwrap().is_success());
    assert!(report.stage(Stage::Annotated).unwrap().is_success());
    assert!(!report.stage(Stage::Semantic).unwrap().is_success());
}

#[test]
fn converted_types_pass_the_forbidden_scan() {
    let fx = FixtureDir::new();
    fx.write("calls.go", CALLS);
    let suite = fx
        .suite()
        .with_transformer(
            ScriptedTransformer::new()
                .with_namespace("go")
                .with_mapping("go:CallExpr", "uast:Call")
                .with_mapping("go:FuncLit", "uast:Function"),
        )
        .with_forbidden_types(["CallExpr", "FuncLit"]);

    let report = run_stage(suite, Stage::Semantic);
    assert_eq!(report.outcome("calls"), Some(&FixtureOutcome::Generated));
}

#[test]
fn conformance_checks_registered_types_only() {
    let fx = FixtureDir::new();
    fx.write(
        "ids.go",
        r#"{"@type": "go:File", "A": {"@type": "go:Ident", "Name": "main"}, "B": {"@type": "uast:Unknown", "X": 1}}"#,
    );
    fx.write("bad.go", r#"{"@type": "go:File", "A": {"@type": "go:Ident", "Name": 7}}"#);
    let suite = fx.suite().with_transformer(
        ScriptedTransformer::new().with_mapping("go:Ident", "uast:Identifier"),
    );

    let report = run_stage(suite, Stage::Semantic);
    assert_eq!(report.outcome("ids"), Some(&FixtureOutcome::Generated));
    assert!(matches!(
        &failures(&report, "bad")[0],
        Failure::Conformance { tag, .. } if tag == "uast:Identifier"
    ));
}

#[test]
fn conformance_reports_lossy_nodes() {
    let fx = FixtureDir::new();
    fx.write(
        "extra.go",
        r#"{"@type": "go:Ident", "Name": "main", "Extra": "dropped"}"#,
    );
    let suite = fx.suite().with_transformer(
        ScriptedTransformer::new().with_mapping("go:Ident", "uast:Identifier"),
    );

    let report = run_stage(suite, Stage::Semantic);
    assert!(matches!(
        &failures(&report, "extra")[0],
        Failure::Conformance { tag, .. } if tag == "uast:Identifier"
    ));
}

/// Annotated node whose recorded start is `shift` bytes after its token
fn token_fixture(token: &str, shift: usize) -> String {
    let offset = r#"{"@token": ""#.len() + shift;
    format!(
        r#"{{"@token": "{}", "@type": "go:Ident", "@pos": {{"start": {{"offset": {}, "line": 1, "col": {}}}}}}}"#,
        token,
        offset,
        offset + 1
    )
}

#[test]
fn position_checks_run_at_annotated_stage() {
    let fx = FixtureDir::new();
    fx.write("good.go", &token_fixture("main", 0));
    fx.write("bad.go", &token_fixture("main", 1).replace("\"line\": 1", "\"line\": 3"));
    let suite = fx
        .suite()
        .with_position_check(TokenSpanCheck::new())
        .with_position_check(LineColumnCheck::new());

    let report = run(suite);
    let annotated = report.stage(Stage::Annotated).unwrap();
    assert_eq!(annotated.outcome("good"), Some(&FixtureOutcome::Generated));

    let bad = failures(annotated, "bad");
    assert_eq!(bad.len(), 2);
    assert!(matches!(&bad[0], Failure::Position { check, .. } if check == "token-span"));
    assert!(matches!(&bad[1], Failure::Position { check, .. } if check == "line-column"));

    // positions are not checked at the other stages
    assert!(report.stage(Stage::Native).unwrap().is_success());
    assert!(report.stage(Stage::Semantic).unwrap().is_success());
}

#[test]
fn all_violations_collected_before_failing() {
    let fx = FixtureDir::new();
    fx.write("calls.go", CALLS);
    fx.write("other.go", r#"{"@type": "go:GoStmt"}"#);
    let suite = fx
        .suite()
        .with_forbidden_types(["CallExpr", "FuncLit", "GoStmt"]);

    let report = run_stage(suite, Stage::Semantic);
    assert_eq!(failures(&report, "calls").len(), 2);
    assert_eq!(failures(&report, "other").len(), 1);
    // the goldens were still reconciled
    assert!(fx.exists("calls.go.sem.uast"));
    assert!(fx.exists("other.go.sem.uast"));
}
