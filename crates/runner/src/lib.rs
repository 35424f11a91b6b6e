//! Fixture suite runner for drivercheck
//!
//! This crate drives a parsing driver and its transformation pipeline through
//! a fixture directory:
//! - Suite: configuration of the driver under test
//! - SuiteRunner: native / uast / semantic stage groups, per-fixture reports
//! - ErrorBudget: per-group circuit breaker on unexpected parse failures
//! - DriverSession: scoped driver acquisition with bounded parses
//! - BenchmarkRunner: transform and fixture benchmarks, allocation counts
//! - sandbox: server instance with the driver installed, over a container runtime
//! - testing: scripted driver and pipeline doubles

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bench;
pub mod budget;
pub mod config;
pub mod error;
pub mod report;
pub mod sandbox;
pub mod session;
pub mod suite;
pub mod testing;

pub use bench::{
    BenchReport, BenchmarkRunner, CountingAllocator, FixtureBench, TransformBench,
    DEFAULT_ITERATIONS,
};
pub use budget::ErrorBudget;
pub use config::{ConfigError, Suite, DEFAULT_MAX_PARSE_ERRORS, DEFAULT_PARSE_TIMEOUT};
pub use error::{RunnerError, RunnerResult};
pub use report::{Failure, FixtureOutcome, FixtureReport, StageReport, SuiteReport};
pub use sandbox::{
    ContainerInfo, ContainerRuntime, ContainerSpec, SandboxConfig, SandboxError, ServerInstance,
};
pub use session::DriverSession;
pub use suite::SuiteRunner;
