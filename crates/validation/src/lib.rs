//! Validation stages for drivercheck
//!
//! Per-stage checks run on every produced tree before golden reconciliation:
//!
//! - **Native**: parse classification only, no structural checks
//! - **Annotated**: configured position-verification checks
//! - **Semantic**: forbidden-type scan and registered-type conformance scan
//!
//! Every check walks an immutable tree and collects *all* violations; none of
//! them stops at the first problem.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conformance;
pub mod forbidden;
pub mod positions;
pub mod stage;
pub mod violation;

pub use conformance::ConformanceScan;
pub use forbidden::{ForbiddenType, ForbiddenTypeScan};
pub use positions::{LineColumnCheck, PositionCheck, TokenSpanCheck};
pub use stage::StageValidator;
pub use violation::Violation;
