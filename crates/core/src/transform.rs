//! Transformation pipeline contract
//!
//! The passes that turn a native tree into preprocessed, annotated and
//! semantic trees live outside this workspace. They are consumed only through
//! [`Transformer::transform`].

use crate::mode::Mode;
use crate::node::Node;
use thiserror::Error;

/// Errors returned by the transformation pipeline
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The pipeline does not support the requested mode
    #[error("unsupported mode: {0}")]
    UnsupportedMode(Mode),

    /// A pass failed
    #[error("{mode} transform failed: {reason}")]
    Failed {
        /// Mode that was requested
        mode: Mode,
        /// Description of the failure
        reason: String,
    },

    /// Conversion into the legacy format failed
    #[error("legacy conversion failed: {0}")]
    Legacy(String),
}

impl TransformError {
    /// Create a pass failure
    pub fn failed(mode: Mode, reason: impl Into<String>) -> Self {
        Self::Failed {
            mode,
            reason: reason.into(),
        }
    }
}

/// The transformation pipeline
pub trait Transformer: Send + Sync {
    /// Namespace prefix of the driver's native type tags (`"go"` for tags
    /// like `"go:FuncDecl"`), if any
    fn namespace(&self) -> Option<&str> {
        None
    }

    /// Transform a native tree into the requested mode.
    ///
    /// The tree is taken by value: passes are free to rewrite it in place.
    fn transform(&self, mode: Mode, code: &str, tree: Node) -> Result<Node, TransformError>;
}

/// Conversion of a semantic tree into the legacy tree format, used only to
/// compare the relative cost of the legacy path in benchmarks
pub trait LegacyConverter: Send + Sync {
    /// Convert a semantic tree
    fn to_legacy(&self, tree: &Node) -> Result<Node, TransformError>;
}
