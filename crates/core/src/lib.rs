//! Core types and contracts for drivercheck
//!
//! This crate defines the foundational pieces shared by every other crate:
//! - Node: the tree value produced by drivers and transformation passes
//! - PreOrder: deterministic, restartable pre-order walk over a tree
//! - Mode: ordered transformation stages (native → semantic)
//! - Driver / DriverError / Deadline: the parsing driver contract
//! - Transformer / LegacyConverter: the transformation pipeline contract
//! - TypeRegistry: semantic type conformance checks
//! - uast: built-in semantic node types
//! - marshal: canonical textual rendering of trees
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod driver;
pub mod error;
pub mod marshal;
pub mod mode;
pub mod node;
pub mod registry;
pub mod transform;
pub mod uast;

pub use driver::{Deadline, Driver, DriverError, DriverFactory};
pub use error::{Error, Result};
pub use mode::Mode;
pub use node::{Node, PreOrder, POS_KEY, ROLE_KEY, TOKEN_KEY, TYPE_KEY};
pub use registry::{RegistryError, TypeRegistry};
pub use transform::{LegacyConverter, TransformError, Transformer};
