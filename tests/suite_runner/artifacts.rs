//! Optional artifacts: preprocessed dumps and viewer documents.

use crate::common::*;

#[test]
fn preprocessed_dump_written_for_tree_stages() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);

    run_stage(fx.suite().write_preprocessed(true), Stage::Annotated);
    let dump = fx.read("hello.go.pre.uast");
    assert!(dump.contains(r#""@mode": "preprocessed""#));
    // the annotated tree was produced from the untouched native tree
    assert!(fx.read("hello.go.uast").contains(r#""@mode": "annotated""#));
}

#[test]
fn preprocessed_dump_off_by_default() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);

    run(fx.suite());
    assert!(!fx.exists("hello.go.pre.uast"));
    assert!(!fx.exists("hello.go.uast.json"));
}

#[test]
fn preprocessed_dump_never_written_for_native_stage() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);

    run_stage(fx.suite().write_preprocessed(true), Stage::Native);
    assert!(!fx.exists("hello.go.pre.uast"));
}

#[test]
fn viewer_documents_for_tree_goldens() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);

    run(fx.suite());
    run(fx.suite().write_viewer_json(true));
    assert!(!fx.exists("hello.go.native.json"));

    let doc: serde_json::Value =
        serde_json::from_str(&fx.read("hello.go.sem.uast.json")).unwrap();
    assert_eq!(doc["lang"], "go");
    assert_eq!(doc["code"], FILE);
    assert_eq!(doc["uast"]["@type"], "go:File");
    assert!(fx.exists("hello.go.uast.json"));
}

#[test]
fn no_viewer_document_on_mismatch() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);
    run(fx.suite());

    fx.write("hello.go", "{}");
    run_stage(fx.suite().write_viewer_json(true), Stage::Semantic);
    assert!(fx.exists("hello.go.sem.uast_got"));
    assert!(!fx.exists("hello.go.sem.uast.json"));
}

#[test]
fn no_viewer_document_when_golden_generated_or_updated() {
    let fx = FixtureDir::new();
    fx.write("hello.go", FILE);
    run(fx.suite().write_viewer_json(true));
    assert!(fx.exists("hello.go.sem.uast"));
    assert!(!fx.exists("hello.go.sem.uast.json"));

    fx.write("hello.go", "{}");
    run_stage(
        fx.suite().write_viewer_json(true).update_uast(true),
        Stage::Semantic,
    );
    assert!(!fx.exists("hello.go.sem.uast_got"));
    assert!(!fx.exists("hello.go.sem.uast.json"));
}

#[test]
fn goldens_are_canonical_renderings() {
    let fx = FixtureDir::new();
    fx.write("hello.go", r#"{"b": 1, "a": [true, null], "@type": "go:File"}"#);

    run_stage(fx.suite(), Stage::Native);
    let golden = fx.read("hello.go.native");
    let tree = drivercheck::marshal::from_text(&golden).unwrap();
    assert_eq!(drivercheck::marshal::to_text(&tree).unwrap(), golden);
    let a = golden.find("\"a\"").unwrap();
    let b = golden.find("\"b\"").unwrap();
    assert!(a < b);
}
