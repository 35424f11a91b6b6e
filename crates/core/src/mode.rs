//! Transformation modes
//!
//! Modes form an ordered progression. A higher mode assumes the tree has
//! already passed through every lower one, so `Mode` derives `Ord` from the
//! declaration order.

use std::fmt;

/// Stage of the transformation pipeline a tree is requested in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// Raw tree exactly as the driver returned it
    Native,
    /// Driver-specific normalization applied, no standard annotations yet
    Preprocessed,
    /// Standardized shape with positional and token metadata
    Annotated,
    /// Driver-specific shapes mapped onto the shared typed vocabulary
    Semantic,
}

impl Mode {
    /// All modes in pipeline order
    pub fn all() -> [Mode; 4] {
        [
            Mode::Native,
            Mode::Preprocessed,
            Mode::Annotated,
            Mode::Semantic,
        ]
    }

    /// Lowercase mode name
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Native => "native",
            Mode::Preprocessed => "preprocessed",
            Mode::Annotated => "annotated",
            Mode::Semantic => "semantic",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
