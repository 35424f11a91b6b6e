//! Error budget
//!
//! Circuit breaker for one stage group: after `ceiling` unexpected parse
//! failures no new fixtures are started, so a broken driver produces a
//! handful of failures instead of one per fixture.
//!
//! The budget is owned by a single run and shared by reference with every
//! fixture execution in it. The counter is atomic because fixture executions
//! may be reported from several threads even when they are issued
//! sequentially.

use std::sync::atomic::{AtomicU32, Ordering};

/// Shared failure counter with a ceiling
#[derive(Debug)]
pub struct ErrorBudget {
    failures: AtomicU32,
    ceiling: u32,
}

impl ErrorBudget {
    /// Create a budget that is exhausted after `ceiling` failures
    pub fn new(ceiling: u32) -> Self {
        Self {
            failures: AtomicU32::new(0),
            ceiling,
        }
    }

    /// Record one failure, returning the updated count
    pub fn record_failure(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    /// Failures recorded so far
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Acquire)
    }

    /// Ceiling this budget was created with
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Whether no new fixture may start
    pub fn is_exhausted(&self) -> bool {
        self.failures() >= self.ceiling
    }

    /// Failures left before exhaustion
    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.failures())
    }
}
