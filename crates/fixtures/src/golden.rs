//! Golden artifact reconciliation
//!
//! Compares freshly produced text against the stored golden artifact. The
//! workflow is a two-phase commit over plain files: compare first, then only
//! replace the golden when the caller explicitly allows it. A mismatch
//! without permission leaves the golden untouched and writes the new text to
//! the pending-diff artifact (`<golden>_got`) for manual inspection.
//!
//! | golden      | produced vs golden | update | result                         |
//! |-------------|--------------------|--------|--------------------------------|
//! | missing     | -                  | -      | write golden, `Generated`      |
//! | present     | equal              | -      | drop pending, `Pass`           |
//! | present     | different          | yes    | write golden, drop pending, `Updated` |
//! | present     | different          | no     | write pending, `Mismatch`      |
//!
//! Equality is exact byte comparison. No normalization is applied.

use crate::error::FixtureResult;
use crate::naming::{pending_name, Fixture, Stage};
use crate::store::FixtureStore;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Result of reconciling produced text with a golden artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No golden existed; the produced text became the golden
    Generated,
    /// Produced text equals the golden
    Pass,
    /// Golden differed and was overwritten under the update flag
    Updated,
    /// Golden differs; produced text was written to the pending artifact
    Mismatch {
        /// Golden artifact path
        golden: PathBuf,
        /// Pending-diff artifact path
        pending: PathBuf,
    },
}

impl ReconcileOutcome {
    /// Whether the outcome must fail the fixture
    pub fn is_failure(&self) -> bool {
        matches!(self, ReconcileOutcome::Mismatch { .. })
    }

    /// Whether golden state on disk was created or changed
    pub fn changed_golden(&self) -> bool {
        matches!(self, ReconcileOutcome::Generated | ReconcileOutcome::Updated)
    }

    /// Shell command comparing the pending artifact with its golden, for
    /// mismatches
    pub fn diff_command(&self) -> Option<String> {
        match self {
            ReconcileOutcome::Mismatch { golden, pending } => Some(format!(
                "diff -d ./{} ./{}",
                display_relative(pending),
                display_relative(golden)
            )),
            _ => None,
        }
    }
}

fn display_relative(path: &std::path::Path) -> String {
    let shown = path.display().to_string();
    shown.trim_start_matches("./").to_string()
}

/// Reconciles produced renderings against the goldens of one fixture store
#[derive(Debug, Clone)]
pub struct GoldenReconciler {
    store: FixtureStore,
}

impl GoldenReconciler {
    /// Create a reconciler over `store`
    pub fn new(store: FixtureStore) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &FixtureStore {
        &self.store
    }

    /// Reconcile the `stage` golden of `fixture` with `produced`
    pub fn reconcile(
        &self,
        fixture: &Fixture,
        stage: Stage,
        produced: &str,
        update: bool,
    ) -> FixtureResult<ReconcileOutcome> {
        self.reconcile_named(&fixture.golden_name(stage), produced, update)
    }

    /// Reconcile the golden artifact named `golden_name` with `produced`
    pub fn reconcile_named(
        &self,
        golden_name: &str,
        produced: &str,
        update: bool,
    ) -> FixtureResult<ReconcileOutcome> {
        let pending = pending_name(golden_name);

        let Some(expected) = self.store.read(golden_name)? else {
            self.store.write(golden_name, produced)?;
            info!(target: "drivercheck::golden", golden = golden_name, "No golden artifact found, generated");
            return Ok(ReconcileOutcome::Generated);
        };

        if expected == produced {
            self.store.delete(&pending)?;
            debug!(target: "drivercheck::golden", golden = golden_name, "Golden artifact matches");
            return Ok(ReconcileOutcome::Pass);
        }

        if update {
            self.store.write(golden_name, produced)?;
            self.store.delete(&pending)?;
            warn!(target: "drivercheck::golden", golden = golden_name, "Golden artifact force-updated");
            return Ok(ReconcileOutcome::Updated);
        }

        self.store.write(&pending, produced)?;
        warn!(
            target: "drivercheck::golden",
            golden = golden_name,
            pending = %pending,
            "Produced output differs from golden artifact"
        );
        Ok(ReconcileOutcome::Mismatch {
            golden: self.store.path(golden_name),
            pending: self.store.path(&pending),
        })
    }
}
