//! Shared helpers for the suite runner tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;

pub use drivercheck::testing::{ScriptedDriver, ScriptedLegacyConverter, ScriptedTransformer};
pub use drivercheck::{
    Failure, FixtureOutcome, LineColumnCheck, Node, RunnerError, Stage, StageReport, Suite,
    SuiteReport, SuiteRunner, TokenSpanCheck,
};

static INIT_TRACING: Once = Once::new();

/// Route runner logs to the test output
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .try_init();
    });
}

/// Fixture directory backed by a temporary directory
pub struct FixtureDir {
    pub dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, text: &str) -> &Self {
        fs::write(self.path(name), text).expect("write fixture file");
        self
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("read fixture file")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    pub fn delete(&self, name: &str) {
        fs::remove_file(self.path(name)).expect("delete fixture file");
    }

    /// Suite over this directory with the scripted doubles
    pub fn suite(&self) -> Suite {
        Suite::new("go", ".go", self.dir.path())
            .with_driver(ScriptedDriver::json)
            .with_transformer(ScriptedTransformer::new().with_namespace("go"))
            .with_parse_timeout(Duration::from_secs(10))
    }
}

/// Run `suite`, panicking on run-level errors
pub fn run(suite: Suite) -> SuiteReport {
    SuiteRunner::new(suite).run().expect("suite run")
}

/// Run one stage of `suite`
pub fn run_stage(suite: Suite, stage: Stage) -> StageReport {
    SuiteRunner::new(suite).run_stage(stage).expect("stage run")
}

/// Failures recorded for fixture `name`
pub fn failures<'a>(report: &'a StageReport, name: &str) -> &'a [Failure] {
    match report.outcome(name) {
        Some(FixtureOutcome::Failed(failures)) => failures,
        other => panic!("expected {} to fail, got {:?}", name, other),
    }
}

/// A small native Go-like tree
pub const FILE: &str = r#"{"@type": "go:File", "Name": {"@type": "go:Ident", "Name": "main"}}"#;
