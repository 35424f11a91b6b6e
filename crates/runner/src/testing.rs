//! Scripted stand-ins for the driver and the transformation pipeline
//!
//! Real drivers run out of process and real pipelines live in the driver
//! repositories. These doubles let the runner, its integration tests and the
//! benchmarks run on nothing but fixture files.
//!
//! [`ScriptedDriver::json`] parses fixture text as JSON: a JSON document is
//! the native tree, anything else is a syntax error. A few reserved inputs
//! simulate driver faults, see the associated constants.

use drivercheck_core::{
    Deadline, Driver, DriverError, LegacyConverter, Mode, Node, TransformError, Transformer,
    TYPE_KEY,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

type ParseFn = dyn Fn(&str, &Deadline) -> Result<Node, DriverError> + Send + Sync;

/// Call counters shared by every clone of a [`ScriptedDriver`]
#[derive(Debug, Default)]
pub struct DriverStats {
    starts: AtomicUsize,
    parses: AtomicUsize,
    closes: AtomicUsize,
}

impl DriverStats {
    /// Calls to `start`
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::Relaxed)
    }

    /// Calls to `parse`
    pub fn parses(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    /// Calls to `close`
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::Relaxed)
    }
}

/// Driver double
#[derive(Clone)]
pub struct ScriptedDriver {
    parse: Arc<ParseFn>,
    start_error: Option<String>,
    stats: Arc<DriverStats>,
}

impl std::fmt::Debug for ScriptedDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedDriver")
            .field("start_error", &self.start_error)
            .field("stats", &self.stats)
            .finish()
    }
}

impl ScriptedDriver {
    /// Input that fails with a driver failure
    pub const CRASH: &'static str = "!crash";
    /// Input that blocks until the deadline expires, then times out
    pub const HANG: &'static str = "!hang";
    /// Input that blocks for a second, ignoring the deadline
    pub const STUCK: &'static str = "!stuck";

    /// Driver that parses its input as JSON
    pub fn json() -> Self {
        Self::with_parser(parse_json)
    }

    /// Driver backed by an arbitrary parse function
    pub fn with_parser<F>(parse: F) -> Self
    where
        F: Fn(&str, &Deadline) -> Result<Node, DriverError> + Send + Sync + 'static,
    {
        Self {
            parse: Arc::new(parse),
            start_error: None,
            stats: Arc::new(DriverStats::default()),
        }
    }

    /// Make `start` fail with a driver failure
    pub fn failing_start(mut self, msg: impl Into<String>) -> Self {
        self.start_error = Some(msg.into());
        self
    }

    /// Counters shared with every clone of this driver
    pub fn stats(&self) -> Arc<DriverStats> {
        Arc::clone(&self.stats)
    }
}

fn parse_json(code: &str, deadline: &Deadline) -> Result<Node, DriverError> {
    match code.trim() {
        ScriptedDriver::CRASH => Err(DriverError::failure("driver process crashed")),
        ScriptedDriver::HANG => {
            while !deadline.is_expired() {
                thread::sleep(Duration::from_millis(5));
            }
            Err(deadline.timeout_error())
        }
        ScriptedDriver::STUCK => {
            thread::sleep(Duration::from_secs(1));
            Err(DriverError::failure("driver recovered too late"))
        }
        text => serde_json::from_str::<serde_json::Value>(text)
            .map(Node::from)
            .map_err(|e| DriverError::input(e.to_string())),
    }
}

impl Driver for ScriptedDriver {
    fn start(&mut self) -> Result<(), DriverError> {
        self.stats.starts.fetch_add(1, Ordering::Relaxed);
        match &self.start_error {
            Some(msg) => Err(DriverError::failure(msg.clone())),
            None => Ok(()),
        }
    }

    fn parse(&mut self, code: &str, deadline: &Deadline) -> Result<Node, DriverError> {
        self.stats.parses.fetch_add(1, Ordering::Relaxed);
        (self.parse)(code, deadline)
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.stats.closes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Key the scripted pipeline stamps on the root with the mode it produced
pub const MODE_KEY: &str = "@mode";

/// Transformation pipeline double
///
/// Every non-native transform stamps the root object with [`MODE_KEY`] and
/// refuses a tree that already carries the requested mode or a higher one,
/// so a pipeline run over a previously transformed tree is an error. The
/// semantic pass additionally renames type tags per the configured mapping.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransformer {
    namespace: Option<String>,
    mappings: BTreeMap<String, String>,
    failing: BTreeSet<String>,
}

impl ScriptedTransformer {
    /// Pipeline with no mappings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the native namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Rename type tag `from` to `to` in the semantic pass
    pub fn with_mapping(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.mappings.insert(from.into(), to.into());
        self
    }

    /// Fail every non-native transform of a tree containing type tag `tag`
    pub fn failing_on(mut self, tag: impl Into<String>) -> Self {
        self.failing.insert(tag.into());
        self
    }

    fn rename(&self, node: &mut Node) {
        match node {
            Node::Object(fields) => {
                if let Some(Node::String(tag)) = fields.get_mut(TYPE_KEY) {
                    if let Some(to) = self.mappings.get(tag.as_str()) {
                        *tag = to.clone();
                    }
                }
                for child in fields.values_mut() {
                    self.rename(child);
                }
            }
            Node::Array(items) => {
                for child in items {
                    self.rename(child);
                }
            }
            _ => {}
        }
    }
}

fn stamped_mode(tree: &Node) -> Option<Mode> {
    let name = tree.get(MODE_KEY)?.as_str()?;
    Mode::all().into_iter().find(|m| m.name() == name)
}

impl Transformer for ScriptedTransformer {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn transform(&self, mode: Mode, _code: &str, mut tree: Node) -> Result<Node, TransformError> {
        if mode == Mode::Native {
            return Ok(tree);
        }
        if let Some(done) = stamped_mode(&tree) {
            if done >= mode {
                return Err(TransformError::failed(
                    mode,
                    format!("tree was already transformed to {}", done),
                ));
            }
        }
        if let Some(tag) = tree
            .pre_order()
            .filter_map(Node::type_of)
            .find(|t| self.failing.contains(*t))
        {
            return Err(TransformError::failed(mode, format!("no mapping for {}", tag)));
        }
        if mode == Mode::Semantic {
            self.rename(&mut tree);
        }
        if let Node::Object(fields) = &mut tree {
            fields.insert(MODE_KEY.to_string(), Node::from(mode.name()));
        }
        Ok(tree)
    }
}

/// Legacy converter double: moves every `@type` tag to an `InternalType`
/// field and drops the other `@` keys
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedLegacyConverter;

impl ScriptedLegacyConverter {
    fn convert(node: &Node) -> Node {
        match node {
            Node::Object(fields) => {
                let mut out = BTreeMap::new();
                for (key, value) in fields {
                    if key == TYPE_KEY {
                        out.insert("InternalType".to_string(), value.clone());
                    } else if !key.starts_with('@') {
                        out.insert(key.clone(), Self::convert(value));
                    }
                }
                Node::Object(out)
            }
            Node::Array(items) => Node::Array(items.iter().map(Self::convert).collect()),
            other => other.clone(),
        }
    }
}

impl LegacyConverter for ScriptedLegacyConverter {
    fn to_legacy(&self, tree: &Node) -> Result<Node, TransformError> {
        if !matches!(tree, Node::Object(_)) {
            return Err(TransformError::Legacy("root is not an object".to_string()));
        }
        Ok(Self::convert(tree))
    }
}
