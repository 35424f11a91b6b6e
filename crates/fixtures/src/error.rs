//! Fixture store error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing fixture files
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture directory cannot be listed
    #[error("cannot read fixture directory {path}: {source}")]
    Directory {
        /// Directory that was scanned
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A fixture file cannot be read, written or removed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A fixture file that must exist is missing
    #[error("fixture file not found: {0}")]
    NotFound(PathBuf),

    /// Fixture extension does not start with a dot
    #[error("invalid fixture extension {0:?}: must start with '.'")]
    InvalidExtension(String),
}

impl FixtureError {
    /// Create a directory scan error
    pub fn directory(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Directory {
            path: path.into(),
            source,
        }
    }

    /// Create a file I/O error
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;
