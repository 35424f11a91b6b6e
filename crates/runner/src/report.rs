//! Suite run reports
//!
//! A run produces one [`FixtureReport`] per discovered fixture and stage.
//! Failures are collected, never thrown: a fixture can fail in several ways
//! at once (one entry per violation) and sibling fixtures keep running.

use drivercheck_core::{DriverError, TransformError};
use drivercheck_fixtures::{Fixture, Stage};
use drivercheck_validation::Violation;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a fixture failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Failure {
    /// Parse of a normal fixture failed
    #[error("parse failed: {0}")]
    ParseFailed(DriverError),

    /// A syntax-error fixture parsed without error
    #[error("syntax error expected, but the driver parsed the input")]
    UnexpectedSuccess,

    /// A syntax-error fixture failed with a driver failure instead of an
    /// input error
    #[error("syntax error expected, got driver failure: {0}")]
    DriverFailureOnSyntaxError(DriverError),

    /// The transformation pipeline failed
    #[error("transform failed: {0}")]
    TransformFailed(TransformError),

    /// Produced rendering differs from the golden artifact
    #[error("unexpected tree returned by the driver, run diff command to debug:\n{diff}")]
    GoldenMismatch {
        /// Golden artifact path
        golden: PathBuf,
        /// Pending-diff artifact path
        pending: PathBuf,
        /// `diff` invocation comparing both files
        diff: String,
    },

    /// Forbidden native type survived into the semantic tree
    #[error("forbidden nodes of type {tag:?} ({count}) found in the tree")]
    ForbiddenType {
        /// Type tag, namespace stripped
        tag: String,
        /// Occurrences
        count: usize,
    },

    /// Registered semantic node does not convert into its representation
    #[error("type check failed for {tag:?}: {reason}")]
    Conformance {
        /// Type tag
        tag: String,
        /// Conversion error
        reason: String,
    },

    /// Position-verification check failed
    #[error("{check}: {message}")]
    Position {
        /// Name of the check
        check: String,
        /// What was inconsistent
        message: String,
    },
}

impl From<Violation> for Failure {
    fn from(v: Violation) -> Self {
        match v {
            Violation::ForbiddenType { tag, count } => Failure::ForbiddenType { tag, count },
            Violation::Conformance { tag, reason } => Failure::Conformance { tag, reason },
            Violation::Position { check, message } => Failure::Position { check, message },
        }
    }
}

/// Outcome of one fixture at one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureOutcome {
    /// Produced output matched the golden artifact
    Passed,
    /// No golden existed; it was generated from the produced output
    Generated,
    /// Golden differed and was force-updated
    Updated,
    /// Syntax-error fixture failed with an input error, as required
    ExpectedSyntaxError,
    /// Not started because the error budget was exhausted
    Skipped,
    /// At least one failure
    Failed(Vec<Failure>),
}

impl FixtureOutcome {
    /// Whether the outcome fails the run
    pub fn is_failure(&self) -> bool {
        matches!(self, FixtureOutcome::Failed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            FixtureOutcome::Passed => "ok",
            FixtureOutcome::Generated => "generated",
            FixtureOutcome::Updated => "updated",
            FixtureOutcome::ExpectedSyntaxError => "ok (syntax error)",
            FixtureOutcome::Skipped => "skipped",
            FixtureOutcome::Failed(_) => "FAILED",
        }
    }
}

/// Result for one fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureReport {
    /// The fixture
    pub fixture: Fixture,
    /// What happened
    pub outcome: FixtureOutcome,
}

/// Results of one stage group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Stage the group ran
    pub stage: Option<Stage>,
    /// Per-fixture results, in discovery order
    pub fixtures: Vec<FixtureReport>,
    /// Unexpected parse failures recorded against the error budget
    pub parse_failures: u32,
    /// Whether the error budget ran out
    pub budget_exhausted: bool,
}

impl StageReport {
    pub(crate) fn new(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }

    /// Whether no fixture failed
    pub fn is_success(&self) -> bool {
        !self.fixtures.iter().any(|f| f.outcome.is_failure())
    }

    /// Every failure, with the fixture it belongs to
    pub fn failures(&self) -> impl Iterator<Item = (&Fixture, &Failure)> {
        self.fixtures.iter().flat_map(|r| match &r.outcome {
            FixtureOutcome::Failed(failures) => failures.iter().map(move |f| (&r.fixture, f)).collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    }

    /// Outcome for the fixture with logical name `name`
    pub fn outcome(&self, name: &str) -> Option<&FixtureOutcome> {
        self.fixtures
            .iter()
            .find(|r| r.fixture.name() == name)
            .map(|r| &r.outcome)
    }

    /// Number of fixtures whose outcome satisfies `pred`
    pub fn count(&self, pred: impl Fn(&FixtureOutcome) -> bool) -> usize {
        self.fixtures.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Results of a whole suite run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteReport {
    /// Language of the suite
    pub lang: String,
    /// One report per stage group, in run order
    pub stages: Vec<StageReport>,
}

impl SuiteReport {
    /// Whether every stage succeeded
    pub fn is_success(&self) -> bool {
        self.stages.iter().all(StageReport::is_success)
    }

    /// Report for `stage`, if it ran
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == Some(stage))
    }

    /// Every failure, with its stage and fixture
    pub fn failures(&self) -> Vec<(Stage, &Fixture, &Failure)> {
        self.stages
            .iter()
            .filter_map(|s| s.stage.map(|stage| (stage, s)))
            .flat_map(|(stage, s)| s.failures().map(move |(fx, f)| (stage, fx, f)))
            .collect()
    }

    /// Human-readable summary of every stage and fixture
    pub fn summary(&self) -> String {
        self.to_string()
    }

    /// Panic with the summary unless the run succeeded.
    ///
    /// Intended as the last line of a `#[test]`.
    #[track_caller]
    pub fn assert_passed(&self) {
        if !self.is_success() {
            panic!("driver fixtures failed\n{}", self.summary());
        }
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} fixtures", self.lang)?;
        for stage in &self.stages {
            let name = stage.stage.map(|s| s.name()).unwrap_or("?");
            writeln!(
                f,
                "[{}] {} fixtures, {} failed, {} skipped",
                name,
                stage.fixtures.len(),
                stage.count(FixtureOutcome::is_failure),
                stage.count(|o| *o == FixtureOutcome::Skipped),
            )?;
            if stage.budget_exhausted {
                writeln!(
                    f,
                    "  stopped after {} unexpected parse failures",
                    stage.parse_failures
                )?;
            }
            for report in &stage.fixtures {
                writeln!(f, "  {}: {}", report.fixture, report.outcome.label())?;
                if let FixtureOutcome::Failed(failures) = &report.outcome {
                    for failure in failures {
                        for line in failure.to_string().lines() {
                            writeln!(f, "    {}", line)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
