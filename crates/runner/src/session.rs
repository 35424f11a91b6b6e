//! Driver sessions
//!
//! A [`DriverSession`] is one started driver instance, acquired for a stage
//! group and closed when the group finishes. Dropping the session closes the
//! driver, so early returns and panics release it too.
//!
//! Every parse is bounded by the session timeout. [`DriverSession::parse`]
//! runs the driver on a worker thread and stops waiting once the deadline
//! passes: the deadline is cancelled (cooperative drivers stop on their own),
//! the worker is abandoned, and the caller gets [`DriverError::Timeout`]. A
//! driver still stuck in an abandoned parse holds the session lock, so later
//! parses time out as well instead of hanging.

use drivercheck_core::{Deadline, Driver, DriverError, DriverFactory, Node};
use parking_lot::Mutex;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// A started driver instance
pub struct DriverSession {
    driver: Arc<Mutex<Box<dyn Driver>>>,
    timeout: Duration,
    closed: bool,
}

impl std::fmt::Debug for DriverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverSession")
            .field("timeout", &self.timeout)
            .field("closed", &self.closed)
            .finish()
    }
}

impl DriverSession {
    /// Construct a driver from `factory` and start it
    pub fn open(factory: &DriverFactory, timeout: Duration) -> Result<Self, DriverError> {
        Self::start(factory(), timeout)
    }

    /// Start an already constructed driver
    pub fn start(mut driver: Box<dyn Driver>, timeout: Duration) -> Result<Self, DriverError> {
        driver.start()?;
        debug!(target: "drivercheck::driver", ?timeout, "Driver started");
        Ok(Self {
            driver: Arc::new(Mutex::new(driver)),
            timeout,
            closed: false,
        })
    }

    /// Parse timeout of this session
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Parse `code`, giving up after the session timeout.
    ///
    /// Never blocks longer than the timeout, whatever the driver does.
    pub fn parse(&self, code: &str) -> Result<Node, DriverError> {
        let deadline = Deadline::after(self.timeout);
        let (tx, rx) = mpsc::channel();

        let driver = Arc::clone(&self.driver);
        let worker_deadline = deadline.clone();
        let code = code.to_string();
        thread::Builder::new()
            .name("drivercheck-parse".to_string())
            .spawn(move || {
                let result = match driver.try_lock_until(worker_deadline.at()) {
                    Some(mut driver) => driver.parse(&code, &worker_deadline),
                    None => Err(worker_deadline.timeout_error()),
                };
                // The receiver is gone when the caller already timed out.
                let _ = tx.send(result);
            })
            .map_err(|e| DriverError::failure(format!("cannot spawn parse worker: {}", e)))?;

        match rx.recv_timeout(deadline.remaining()) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                deadline.cancel();
                warn!(target: "drivercheck::driver", timeout = ?self.timeout, "Parse timed out, cancelled");
                Err(deadline.timeout_error())
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(DriverError::failure("parse worker terminated without a result"))
            }
        }
    }

    /// Close the driver
    pub fn close(mut self) -> Result<(), DriverError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.driver.try_lock_for(self.timeout) {
            Some(mut driver) => {
                driver.close()?;
                debug!(target: "drivercheck::driver", "Driver closed");
                Ok(())
            }
            None => Err(DriverError::failure(
                "driver is still busy with an abandoned parse, cannot close",
            )),
        }
    }
}

impl Drop for DriverSession {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(target: "drivercheck::driver", error = %e, "Failed to close driver");
        }
    }
}
