//! Fixture store for drivercheck
//!
//! This crate handles everything that touches the fixture directory:
//!
//! - Naming: the bit-exact file naming convention for inputs and artifacts
//! - Discovery: scanning a directory for fixture inputs in stable order
//! - Store: reading, writing and deleting fixture files
//! - Golden reconciliation: compare / generate / update / pending-diff

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod golden;
pub mod naming;
pub mod store;

pub use error::{FixtureError, FixtureResult};
pub use golden::{GoldenReconciler, ReconcileOutcome};
pub use naming::{
    Fixture, FixtureKind, Stage, BENCH_PREFIX, GOT_SUFFIX, NATIVE_EXT, PREPROCESSED_EXT,
    SEMANTIC_EXT, SYNTAX_ERROR_MARKER, UAST_EXT, VIEWER_EXT,
};
pub use store::FixtureStore;
