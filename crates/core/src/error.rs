//! Error types for drivercheck core
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for tree handling
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (reading or writing rendered trees)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Tree does not have the expected shape
    #[error("Invalid tree: {0}")]
    InvalidTree(String),
}

impl Error {
    /// Create an invalid tree error
    pub fn invalid_tree(msg: impl Into<String>) -> Self {
        Self::InvalidTree(msg.into())
    }
}
