//! Suite runner integration tests
//!
//! Every test builds a fixture directory in a `TempDir` and runs the scripted
//! driver and pipeline doubles over it.

mod common;

mod artifacts;
mod benchmarks;
mod budget;
mod golden;
mod stages;
mod syntax_errors;
mod timeouts;
