//! Runner error types
//!
//! Only unrecoverable preconditions surface as [`RunnerError`]: an unreadable
//! fixture directory, a failing artifact write, a driver that cannot start.
//! Per-fixture problems are recorded in the report instead.

use crate::config::ConfigError;
use drivercheck_core::{DriverError, TransformError};
use drivercheck_fixtures::FixtureError;
use thiserror::Error;

/// Errors that abort a suite or benchmark run
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Suite configuration is invalid
    #[error("invalid suite configuration: {0}")]
    Config(#[from] ConfigError),

    /// Fixture directory or artifact I/O failed
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// A tree could not be rendered
    #[error("cannot render tree: {0}")]
    Render(#[from] drivercheck_core::Error),

    /// The driver could not be started
    #[error("cannot start driver: {0}")]
    DriverStart(#[source] DriverError),

    /// Parsing failed where the run cannot continue (benchmarks)
    #[error("parse failed: {0}")]
    Parse(#[source] DriverError),

    /// Transformation failed where the run cannot continue (benchmarks)
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),
}

/// Result type for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;
