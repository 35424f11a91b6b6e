//! Structural and semantic violations

use thiserror::Error;

/// A single problem found by a validation stage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Nodes of a forbidden native type survived into the semantic tree
    #[error("forbidden nodes of type {tag:?} ({count}) found in the tree")]
    ForbiddenType {
        /// Type tag, namespace stripped
        tag: String,
        /// Number of occurrences
        count: usize,
    },

    /// A node with a registered semantic type does not convert into it
    #[error("type check failed for {tag:?}: {reason}")]
    Conformance {
        /// Type tag of the node
        tag: String,
        /// Why the conversion failed
        reason: String,
    },

    /// Token or positional information disagrees with the source text
    #[error("{check}: {message}")]
    Position {
        /// Name of the check that failed
        check: String,
        /// Description of the mismatch
        message: String,
    },
}

impl Violation {
    /// Create a position violation
    pub fn position(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Position {
            check: check.into(),
            message: message.into(),
        }
    }
}
