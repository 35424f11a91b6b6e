//! drivercheck - fixture reconciliation and validation for language-parsing drivers
//!
//! A driver turns source text into a native tree; a transformation pipeline
//! turns that into annotated and semantic trees. drivercheck runs both over a
//! directory of checked-in fixtures, compares every tree against its golden
//! artifact, checks structural and semantic invariants, and benchmarks the
//! pipeline.
//!
//! # Quick Start
//!
//! ```ignore
//! use drivercheck::{Suite, SuiteRunner};
//!
//! #[test]
//! fn fixtures() {
//!     let suite = Suite::new("go", ".go", "fixtures")
//!         .with_driver(GoDriver::new)
//!         .with_transformer(go_transforms())
//!         .with_forbidden_types(["CallExpr", "FuncLit"])
//!         .apply_env_overrides();
//!
//!     SuiteRunner::new(suite).run().unwrap().assert_passed();
//! }
//! ```
//!
//! # Architecture
//!
//! - `drivercheck-core`: tree value, driver and pipeline contracts, type registry
//! - `drivercheck-fixtures`: naming convention, fixture store, golden reconciliation
//! - `drivercheck-validation`: per-stage checks
//! - `drivercheck-runner`: suite runner, error budget, benchmarks, sandbox

pub use drivercheck_core::{
    marshal, uast, Deadline, Driver, DriverError, DriverFactory, LegacyConverter, Mode, Node,
    TransformError, Transformer, TypeRegistry,
};
pub use drivercheck_fixtures::{
    Fixture, FixtureKind, FixtureStore, GoldenReconciler, ReconcileOutcome, Stage,
};
pub use drivercheck_runner::*;
pub use drivercheck_validation::{
    ForbiddenTypeScan, LineColumnCheck, PositionCheck, StageValidator, TokenSpanCheck, Violation,
};
