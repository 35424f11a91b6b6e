//! Suite runner
//!
//! Runs the fixtures of a [`Suite`] through three stage groups, in order:
//!
//! | group      | tree checked                      | golden         | update flag     |
//! |------------|-----------------------------------|----------------|-----------------|
//! | `native`   | raw driver output                 | `.native`      | `update_native` |
//! | `uast`     | transformed to annotated mode     | `.uast`        | `update_uast`   |
//! | `semantic` | transformed to semantic mode      | `.sem.uast`    | `update_uast`   |
//!
//! Each group discovers fixtures afresh, starts its own driver session and
//! owns its own [`ErrorBudget`]. Fixtures run one at a time in directory-scan
//! order. Once the budget is exhausted the remaining fixtures of the group
//! are reported as skipped.
//!
//! Only unrecoverable preconditions abort the run (see [`RunnerError`]).
//! Everything else is recorded against the fixture it happened to.

use crate::budget::ErrorBudget;
use crate::config::{ConfigError, Suite};
use crate::error::{RunnerError, RunnerResult};
use crate::report::{Failure, FixtureOutcome, FixtureReport, StageReport, SuiteReport};
use crate::session::DriverSession;
use drivercheck_core::{marshal, Mode, Node, Transformer};
use drivercheck_fixtures::{Fixture, FixtureStore, GoldenReconciler, ReconcileOutcome, Stage};
use drivercheck_validation::StageValidator;
use tracing::{debug, info, warn};

/// Runs a suite's fixtures and collects a [`SuiteReport`]
#[derive(Debug)]
pub struct SuiteRunner {
    suite: Suite,
}

impl SuiteRunner {
    /// Create a runner for `suite`
    pub fn new(suite: Suite) -> Self {
        Self { suite }
    }

    /// The suite being run
    pub fn suite(&self) -> &Suite {
        &self.suite
    }

    /// Run every stage group
    pub fn run(&self) -> RunnerResult<SuiteReport> {
        self.suite.validate()?;
        info!(
            target: "drivercheck::suite",
            lang = %self.suite.lang,
            path = %self.suite.path.display(),
            "Running driver fixtures"
        );

        let mut report = SuiteReport {
            lang: self.suite.lang.clone(),
            stages: Vec::with_capacity(Stage::all().len()),
        };
        for stage in Stage::all() {
            report.stages.push(self.run_stage(stage)?);
        }

        info!(
            target: "drivercheck::suite",
            lang = %self.suite.lang,
            failures = report.failures().len(),
            "Driver fixtures finished"
        );
        Ok(report)
    }

    /// Run a single stage group
    pub fn run_stage(&self, stage: Stage) -> RunnerResult<StageReport> {
        self.suite.validate()?;
        let factory = self
            .suite
            .driver_factory()
            .ok_or(ConfigError::MissingDriver)?;
        let transformer = self
            .suite
            .transformer()
            .ok_or(ConfigError::MissingTransformer)?;

        let store = self.suite.store();
        let fixtures = store.discover(&self.suite.ext)?;
        debug!(
            target: "drivercheck::suite",
            stage = %stage,
            count = fixtures.len(),
            "Discovered fixtures"
        );

        let budget = ErrorBudget::new(self.suite.max_parse_errors);
        let session = DriverSession::open(factory, self.suite.parse_timeout)
            .map_err(RunnerError::DriverStart)?;

        let run = StageRun {
            suite: &self.suite,
            stage,
            store: &store,
            reconciler: GoldenReconciler::new(store.clone()),
            validator: self.suite.validator(),
            transformer: &**transformer,
            session: &session,
            budget: &budget,
        };

        let mut report = StageReport::new(stage);
        for fixture in fixtures {
            let outcome = if budget.is_exhausted() {
                debug!(target: "drivercheck::suite", fixture = %fixture, stage = %stage, "Skipped, error budget exhausted");
                FixtureOutcome::Skipped
            } else {
                run.fixture(&fixture)?
            };
            run.log_outcome(&fixture, &outcome);
            report.fixtures.push(FixtureReport { fixture, outcome });
        }
        drop(run);

        report.parse_failures = budget.failures();
        report.budget_exhausted = budget.is_exhausted();
        if report.budget_exhausted {
            warn!(
                target: "drivercheck::suite",
                stage = %stage,
                failures = report.parse_failures,
                skipped = report.count(|o| *o == FixtureOutcome::Skipped),
                "Too many parse failures, remaining fixtures skipped"
            );
        }

        if let Err(e) = session.close() {
            warn!(target: "drivercheck::driver", stage = %stage, error = %e, "Failed to close driver");
        }
        Ok(report)
    }
}

/// Everything one stage group shares between its fixtures
struct StageRun<'a> {
    suite: &'a Suite,
    stage: Stage,
    store: &'a FixtureStore,
    reconciler: GoldenReconciler,
    validator: StageValidator,
    transformer: &'a dyn Transformer,
    session: &'a DriverSession,
    budget: &'a ErrorBudget,
}

impl StageRun<'_> {
    fn fixture(&self, fixture: &Fixture) -> RunnerResult<FixtureOutcome> {
        let code = self.store.read_required(fixture.file_name())?;
        let parsed = self.session.parse(&code);

        if fixture.is_syntax_error() {
            return Ok(match parsed {
                Ok(_) => FixtureOutcome::Failed(vec![Failure::UnexpectedSuccess]),
                Err(e) if e.is_driver_failure() => {
                    FixtureOutcome::Failed(vec![Failure::DriverFailureOnSyntaxError(e)])
                }
                Err(_) => FixtureOutcome::ExpectedSyntaxError,
            });
        }

        let native = match parsed {
            Ok(tree) => tree,
            Err(e) => {
                let failures = self.budget.record_failure();
                warn!(
                    target: "drivercheck::suite",
                    fixture = %fixture,
                    stage = %self.stage,
                    failures,
                    error = %e,
                    "Parse failed"
                );
                return Ok(FixtureOutcome::Failed(vec![Failure::ParseFailed(e)]));
            }
        };

        let tree = match self.stage {
            Stage::Native => native,
            stage => match self.transform(fixture, &code, native, stage.mode())? {
                Ok(tree) => tree,
                Err(failure) => return Ok(FixtureOutcome::Failed(vec![failure])),
            },
        };

        let mut failures: Vec<Failure> = self
            .validator
            .validate(self.stage, &code, &tree)
            .into_iter()
            .map(Failure::from)
            .collect();

        let text = marshal::to_text(&tree)?;
        if self.suite.debug {
            debug!(
                target: "drivercheck::suite",
                fixture = %fixture,
                stage = %self.stage,
                rendering = %text,
                "Produced rendering"
            );
        }

        let update = match self.stage {
            Stage::Native => self.suite.update_native,
            Stage::Annotated | Stage::Semantic => self.suite.update_uast,
        };
        let reconciled = self
            .reconciler
            .reconcile(fixture, self.stage, &text, update)?;

        if self.suite.write_viewer_json
            && self.stage != Stage::Native
            && reconciled == ReconcileOutcome::Pass
        {
            let viewer = marshal::to_viewer_json(&self.suite.lang, &code, &tree)?;
            self.store.write(&fixture.viewer_name(self.stage), &viewer)?;
        }

        let diff = reconciled.diff_command();
        let outcome = match reconciled {
            ReconcileOutcome::Generated => FixtureOutcome::Generated,
            ReconcileOutcome::Pass => FixtureOutcome::Passed,
            ReconcileOutcome::Updated => FixtureOutcome::Updated,
            ReconcileOutcome::Mismatch { golden, pending } => {
                failures.push(Failure::GoldenMismatch {
                    golden,
                    pending,
                    diff: diff.unwrap_or_default(),
                });
                FixtureOutcome::Passed
            }
        };

        Ok(if failures.is_empty() {
            outcome
        } else {
            FixtureOutcome::Failed(failures)
        })
    }

    /// Transform the native tree into `mode`, writing the preprocessed dump
    /// first when requested. Pipeline errors are fixture failures; only
    /// artifact I/O aborts.
    fn transform(
        &self,
        fixture: &Fixture,
        code: &str,
        native: Node,
        mode: Mode,
    ) -> RunnerResult<Result<Node, Failure>> {
        if self.suite.write_preprocessed {
            match self
                .transformer
                .transform(Mode::Preprocessed, code, native.clone())
            {
                Ok(pre) => {
                    self.store
                        .write(&fixture.preprocessed_name(), &marshal::to_text(&pre)?)?;
                }
                Err(e) => return Ok(Err(Failure::TransformFailed(e))),
            }
        }
        Ok(self
            .transformer
            .transform(mode, code, native)
            .map_err(Failure::TransformFailed))
    }

    fn log_outcome(&self, fixture: &Fixture, outcome: &FixtureOutcome) {
        match outcome {
            FixtureOutcome::Failed(failures) => {
                for failure in failures {
                    warn!(
                        target: "drivercheck::suite",
                        fixture = %fixture,
                        stage = %self.stage,
                        "{}",
                        failure
                    );
                }
            }
            outcome if self.suite.debug => {
                info!(target: "drivercheck::suite", fixture = %fixture, stage = %self.stage, ?outcome, "Fixture finished");
            }
            _ => {}
        }
    }
}
