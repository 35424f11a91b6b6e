//! Per-stage dispatch
//!
//! [`StageValidator`] bundles the checks configured for a suite and runs the
//! ones that apply to a given stage.

use crate::conformance::ConformanceScan;
use crate::forbidden::ForbiddenTypeScan;
use crate::positions::PositionCheck;
use crate::violation::Violation;
use drivercheck_core::{Node, TypeRegistry};
use drivercheck_fixtures::Stage;
use std::sync::Arc;
use tracing::debug;

/// Checks configured for one suite
#[derive(Debug, Clone)]
pub struct StageValidator {
    forbidden: ForbiddenTypeScan,
    registry: Arc<TypeRegistry>,
    position_checks: Vec<Arc<dyn PositionCheck>>,
}

impl Default for StageValidator {
    fn default() -> Self {
        Self {
            forbidden: ForbiddenTypeScan::default(),
            registry: Arc::new(TypeRegistry::new()),
            position_checks: Vec::new(),
        }
    }
}

impl StageValidator {
    /// Validator with no checks configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbidden-type scan used at the semantic stage
    pub fn with_forbidden(mut self, scan: ForbiddenTypeScan) -> Self {
        self.forbidden = scan;
        self
    }

    /// Registry used by the conformance scan at the semantic stage
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Position checks used at the annotated stage
    pub fn with_position_checks(mut self, checks: Vec<Arc<dyn PositionCheck>>) -> Self {
        self.position_checks = checks;
        self
    }

    /// Run every check that applies to `stage`.
    ///
    /// - native: nothing
    /// - annotated: position checks, in configuration order
    /// - semantic: forbidden-type scan, then conformance scan
    pub fn validate(&self, stage: Stage, code: &str, tree: &Node) -> Vec<Violation> {
        let violations: Vec<Violation> = match stage {
            Stage::Native => Vec::new(),
            Stage::Annotated => self
                .position_checks
                .iter()
                .flat_map(|check| check.verify(code, tree))
                .collect(),
            Stage::Semantic => self
                .forbidden
                .scan(tree)
                .into_iter()
                .map(Violation::from)
                .chain(ConformanceScan::new(&self.registry).scan(tree))
                .collect(),
        };
        if !violations.is_empty() {
            debug!(
                target: "drivercheck::validation",
                stage = %stage,
                count = violations.len(),
                "Validation found violations"
            );
        }
        violations
    }
}
