//! Driver contract
//!
//! A driver turns source text into a native tree. The driver itself is an
//! external component; this module only fixes the shape of the conversation:
//! `start`, any number of `parse` calls bounded by a [`Deadline`], `close`.
//!
//! Errors are split into two classes:
//! - driver failures (infrastructure or protocol faults, timeouts), which
//!   are never expected
//! - input errors (the source text is malformed), which are expected only
//!   for syntax-error fixtures

use crate::node::Node;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors returned by a driver
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// Infrastructure or protocol fault in the driver
    #[error("driver failure: {0}")]
    Failure(String),

    /// The source text could not be parsed
    #[error("syntax error: {}", .0.join("; "))]
    Input(Vec<String>),

    /// The parse did not finish before its deadline
    #[error("parse timed out after {0:?}")]
    Timeout(Duration),
}

impl DriverError {
    /// Create a driver failure
    pub fn failure(msg: impl Into<String>) -> Self {
        Self::Failure(msg.into())
    }

    /// Create an input error with a single message
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(vec![msg.into()])
    }

    /// Whether this error is classified as a driver failure.
    ///
    /// Timeouts count as driver failures: the driver never produced a
    /// verdict about the input.
    pub fn is_driver_failure(&self) -> bool {
        matches!(self, DriverError::Failure(_) | DriverError::Timeout(_))
    }

    /// Whether this error is classified as an input error
    pub fn is_input_error(&self) -> bool {
        matches!(self, DriverError::Input(_))
    }
}

/// A parsing driver
///
/// Implementations are driven from a single thread at a time, but a parse
/// that overruns its deadline may be abandoned on a worker thread, so the
/// driver must be `Send`.
pub trait Driver: Send {
    /// Acquire whatever the driver needs (process, connection, ...)
    fn start(&mut self) -> Result<(), DriverError>;

    /// Parse `code` into a native tree.
    ///
    /// Long-running implementations should poll [`Deadline::is_expired`] and
    /// give up with [`DriverError::Timeout`] once it returns true.
    fn parse(&mut self, code: &str, deadline: &Deadline) -> Result<Node, DriverError>;

    /// Release everything acquired by `start`
    fn close(&mut self) -> Result<(), DriverError>;
}

/// Constructor for fresh driver instances
pub type DriverFactory = Arc<dyn Fn() -> Box<dyn Driver> + Send + Sync>;

/// Point in time after which a parse must stop, plus an explicit cancel flag.
///
/// Clones share the cancel flag, so the caller can cancel a parse running on
/// another thread.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    timeout: Duration,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Instant at which the deadline expires
    pub fn at(&self) -> Instant {
        self.at
    }

    /// Timeout this deadline was created with
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before expiry (zero once expired)
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Cancel the deadline early
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether `cancel` was called on this deadline or a clone of it
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Whether the work bounded by this deadline must stop
    pub fn is_expired(&self) -> bool {
        self.is_cancelled() || Instant::now() >= self.at
    }

    /// The timeout error for this deadline
    pub fn timeout_error(&self) -> DriverError {
        DriverError::Timeout(self.timeout)
    }
}
