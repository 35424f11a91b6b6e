//! Forbidden-type scan
//!
//! Verifies that native constructs were fully converted into semantic nodes:
//! any node whose type tag (with the driver namespace stripped) is in the
//! forbidden list is counted, and every forbidden tag with at least one
//! occurrence is reported. Reports are in lexicographic tag order.

use crate::violation::Violation;
use drivercheck_core::Node;
use std::collections::BTreeMap;

/// One forbidden tag and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenType {
    /// Type tag, namespace stripped
    pub tag: String,
    /// Number of occurrences, always at least one
    pub count: usize,
}

impl From<ForbiddenType> for Violation {
    fn from(f: ForbiddenType) -> Self {
        Violation::ForbiddenType {
            tag: f.tag,
            count: f.count,
        }
    }
}

/// Scanner for forbidden type tags
#[derive(Debug, Clone, Default)]
pub struct ForbiddenTypeScan {
    forbidden: Vec<String>,
    namespace: Option<String>,
}

impl ForbiddenTypeScan {
    /// Scan for the given tags
    pub fn new<I, S>(forbidden: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut forbidden: Vec<String> = forbidden.into_iter().map(Into::into).collect();
        forbidden.sort();
        forbidden.dedup();
        Self {
            forbidden,
            namespace: None,
        }
    }

    /// Strip `<namespace>:` from tags before comparing
    pub fn with_namespace(mut self, namespace: Option<impl Into<String>>) -> Self {
        let namespace: Option<String> = namespace.map(Into::into);
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    /// Whether there is nothing to scan for
    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
    }

    fn strip<'a>(&self, tag: &'a str) -> &'a str {
        match &self.namespace {
            Some(ns) => tag
                .strip_prefix(ns.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .unwrap_or(tag),
            None => tag,
        }
    }

    /// Walk the whole tree and report every forbidden tag that occurred
    pub fn scan(&self, tree: &Node) -> Vec<ForbiddenType> {
        if self.forbidden.is_empty() {
            return Vec::new();
        }
        let mut counts: BTreeMap<&str, usize> =
            self.forbidden.iter().map(|t| (t.as_str(), 0)).collect();

        for node in tree.pre_order() {
            let Some(tag) = node.type_of() else {
                continue;
            };
            if let Some(count) = counts.get_mut(self.strip(tag)) {
                *count += 1;
            }
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(tag, count)| ForbiddenType {
                tag: tag.to_string(),
                count,
            })
            .collect()
    }
}
