//! Position verification for annotated trees
//!
//! Annotated nodes record where they came from:
//!
//! ```text
//! {
//!   "@type": "go:Ident",
//!   "@token": "main",
//!   "@pos": {
//!     "@type": "uast:Positions",
//!     "start": { "@type": "uast:Position", "offset": 13, "line": 2, "col": 6 },
//!     "end":   { "@type": "uast:Position", "offset": 17, "line": 2, "col": 10 }
//!   }
//! }
//! ```
//!
//! A [`PositionCheck`] compares that metadata with the original source text
//! and reports every inconsistency it finds.

use crate::violation::Violation;
use drivercheck_core::{Node, POS_KEY, TOKEN_KEY};
use std::fmt;

/// A check of token and position metadata against the source text
pub trait PositionCheck: fmt::Debug + Send + Sync {
    /// Short name used in violation reports
    fn name(&self) -> &str;

    /// Check `tree` against `code`, returning every violation found
    fn verify(&self, code: &str, tree: &Node) -> Vec<Violation>;
}

fn describe(node: &Node) -> &str {
    node.type_of().unwrap_or("<untyped>")
}

fn offset_of(pos: &Node, which: &str) -> Option<i64> {
    pos.get(which)?.get("offset")?.as_i64()
}

/// Checks that the source text at each node's recorded span equals the
/// node's token
///
/// The span is `[start.offset, end.offset)`. When the node has no end
/// position the span length is the token length. Nodes without a token or
/// without a start offset are skipped.
#[derive(Debug, Clone)]
pub struct TokenSpanCheck {
    token_key: String,
    pos_key: String,
}

impl Default for TokenSpanCheck {
    fn default() -> Self {
        Self {
            token_key: TOKEN_KEY.to_string(),
            pos_key: POS_KEY.to_string(),
        }
    }
}

impl TokenSpanCheck {
    /// Check using the standard `@token` / `@pos` keys
    pub fn new() -> Self {
        Self::default()
    }

    /// Read tokens from a different key
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    fn check_node(&self, code: &str, node: &Node) -> Option<Violation> {
        let token = node.get(&self.token_key)?.as_str()?;
        let pos = node.get(&self.pos_key)?;
        let start = offset_of(pos, "start")?;
        let fail = |message: String| Some(Violation::position(self.name(), message));

        let end = match offset_of(pos, "end") {
            Some(end) => end,
            None => match i64::try_from(token.len())
                .ok()
                .and_then(|len| start.checked_add(len))
            {
                Some(end) => end,
                None => {
                    return fail(format!(
                        "{} token {:?}: span starting at {} outside source of length {}",
                        describe(node),
                        token,
                        start,
                        code.len()
                    ))
                }
            },
        };

        if start < 0 || end < start || end as usize > code.len() {
            return fail(format!(
                "{} token {:?}: span [{}, {}) outside source of length {}",
                describe(node),
                token,
                start,
                end,
                code.len()
            ));
        }
        let Some(actual) = code.get(start as usize..end as usize) else {
            return fail(format!(
                "{} token {:?}: span [{}, {}) splits a character",
                describe(node),
                token,
                start,
                end
            ));
        };
        if actual != token {
            return fail(format!(
                "{} token {:?} does not match source {:?} at [{}, {})",
                describe(node),
                token,
                actual,
                start,
                end
            ));
        }
        None
    }
}

impl PositionCheck for TokenSpanCheck {
    fn name(&self) -> &str {
        "token-span"
    }

    fn verify(&self, code: &str, tree: &Node) -> Vec<Violation> {
        tree.pre_order()
            .filter_map(|node| self.check_node(code, node))
            .collect()
    }
}

/// Checks that the line and column of every recorded position agree with
/// its byte offset
///
/// Lines and columns are 1-based; columns count bytes from the start of the
/// line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineColumnCheck;

impl LineColumnCheck {
    /// Create the check
    pub fn new() -> Self {
        Self
    }

    fn line_starts(code: &str) -> Vec<usize> {
        std::iter::once(0)
            .chain(code.match_indices('\n').map(|(i, _)| i + 1))
            .collect()
    }

    fn line_col(line_starts: &[usize], offset: usize) -> (usize, usize) {
        let line = match line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - line_starts[line] + 1)
    }
}

impl PositionCheck for LineColumnCheck {
    fn name(&self) -> &str {
        "line-column"
    }

    fn verify(&self, code: &str, tree: &Node) -> Vec<Violation> {
        let line_starts = Self::line_starts(code);
        let mut violations = Vec::new();

        for node in tree.pre_order() {
            let Some(pos) = node.get(POS_KEY) else {
                continue;
            };
            for which in ["start", "end"] {
                let Some(point) = pos.get(which) else {
                    continue;
                };
                let (Some(offset), Some(line), Some(col)) = (
                    point.get("offset").and_then(Node::as_i64),
                    point.get("line").and_then(Node::as_i64),
                    point.get("col").and_then(Node::as_i64),
                ) else {
                    continue;
                };
                if offset < 0 || offset as usize > code.len() {
                    violations.push(Violation::position(
                        self.name(),
                        format!(
                            "{} {} offset {} outside source of length {}",
                            describe(node),
                            which,
                            offset,
                            code.len()
                        ),
                    ));
                    continue;
                }
                let (want_line, want_col) = Self::line_col(&line_starts, offset as usize);
                if line as usize != want_line || col as usize != want_col {
                    violations.push(Violation::position(
                        self.name(),
                        format!(
                            "{} {} offset {} is {}:{}, recorded {}:{}",
                            describe(node),
                            which,
                            offset,
                            want_line,
                            want_col,
                            line,
                            col
                        ),
                    ));
                }
            }
        }
        violations
    }
}
