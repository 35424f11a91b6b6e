//! Registered-type conformance scan
//!
//! Every node whose tag is registered in the [`TypeRegistry`] must convert
//! losslessly into its registered representation. Unregistered tags are
//! skipped: the registry deliberately covers only the shared vocabulary, not
//! the native types that may legitimately remain in a semantic tree.

use crate::violation::Violation;
use drivercheck_core::{Node, TypeRegistry};

/// Scanner checking registered semantic types
#[derive(Debug, Clone, Copy)]
pub struct ConformanceScan<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> ConformanceScan<'a> {
    /// Scan against `registry`
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Walk the whole tree and report every non-conforming node, in
    /// pre-order
    pub fn scan(&self, tree: &Node) -> Vec<Violation> {
        tree.pre_order()
            .filter_map(|node| {
                let tag = node.type_of()?;
                if !self.registry.is_registered(tag) {
                    return None;
                }
                self.registry
                    .check(node)
                    .err()
                    .map(|err| Violation::Conformance {
                        tag: tag.to_string(),
                        reason: err.to_string(),
                    })
            })
            .collect()
    }
}
