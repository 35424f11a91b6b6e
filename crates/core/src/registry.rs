//! Semantic type registry
//!
//! Maps a semantic type tag (`"uast:Identifier"`) to a typed Rust
//! representation. A node conforms to its registered type when it converts
//! into that representation *losslessly*: deserializing the node and
//! serializing the result back must reproduce every non-metadata field.
//!
//! Metadata keys (those starting with `@`, like `@type` or `@pos`) are not
//! part of the comparison. Fields the representation omits by default are
//! accepted only when the node carries an empty value for them.
//!
//! The registry intentionally covers only a subset of tags; callers decide
//! what to do with [`RegistryError::NotRegistered`].

use crate::node::Node;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors produced by conformance checks
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The tag has no registered representation
    #[error("type not registered: {0}")]
    NotRegistered(String),

    /// The node could not be converted into the registered representation
    #[error("cannot convert node to {tag}: {reason}")]
    Conversion {
        /// Type tag of the node
        tag: String,
        /// Conversion error
        reason: String,
    },

    /// Conversion succeeded but dropped or altered part of the node
    #[error("lossy conversion to {tag} at {path}")]
    Lossy {
        /// Type tag of the node
        tag: String,
        /// Path of the first field that differs
        path: String,
    },
}

impl RegistryError {
    /// Whether the error only says the tag is unknown
    pub fn is_not_registered(&self) -> bool {
        matches!(self, RegistryError::NotRegistered(_))
    }
}

type Check = Box<dyn Fn(&str, &Value) -> Result<(), RegistryError> + Send + Sync>;

/// Registry of semantic types keyed by type tag
#[derive(Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, Check>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in UAST types
    pub fn uast() -> Self {
        let mut registry = Self::new();
        crate::uast::register_all(&mut registry);
        registry
    }

    /// Register `T` as the representation of `tag`, replacing any previous
    /// registration
    pub fn register<T>(&mut self, tag: impl Into<String>)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.types.insert(tag.into(), Box::new(check_lossless::<T>));
    }

    /// Whether `tag` has a registered representation
    pub fn is_registered(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Registered tags in lexicographic order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Number of registered tags
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Check that `node` converts losslessly into the representation
    /// registered for its type tag
    pub fn check(&self, node: &Node) -> Result<(), RegistryError> {
        let tag = node.type_of().unwrap_or_default();
        let check = self
            .types
            .get(tag)
            .ok_or_else(|| RegistryError::NotRegistered(tag.to_string()))?;
        check(tag, &node.to_json())
    }
}

fn check_lossless<T>(tag: &str, original: &Value) -> Result<(), RegistryError>
where
    T: Serialize + DeserializeOwned,
{
    let typed: T =
        serde_json::from_value(original.clone()).map_err(|e| RegistryError::Conversion {
            tag: tag.to_string(),
            reason: e.to_string(),
        })?;
    let rebuilt = serde_json::to_value(&typed).map_err(|e| RegistryError::Conversion {
        tag: tag.to_string(),
        reason: e.to_string(),
    })?;
    match first_difference(original, &rebuilt, "$") {
        Some(path) => Err(RegistryError::Lossy {
            tag: tag.to_string(),
            path,
        }),
        None => Ok(()),
    }
}

/// Path of the first non-metadata difference between two values
fn first_difference(original: &Value, rebuilt: &Value, path: &str) -> Option<String> {
    match (original, rebuilt) {
        (Value::Object(a), Value::Object(b)) => {
            let keys = a.keys().chain(b.keys()).filter(|k| !k.starts_with('@'));
            let mut seen = std::collections::BTreeSet::new();
            for key in keys {
                if !seen.insert(key) {
                    continue;
                }
                let child = format!("{}.{}", path, key);
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => {
                        if let Some(p) = first_difference(x, y, &child) {
                            return Some(p);
                        }
                    }
                    (Some(v), None) | (None, Some(v)) => {
                        if !is_empty_value(v) {
                            return Some(child);
                        }
                    }
                    (None, None) => {}
                }
            }
            None
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Some(path.to_string());
            }
            a.iter()
                .zip(b)
                .enumerate()
                .find_map(|(i, (x, y))| first_difference(x, y, &format!("{}[{}]", path, i)))
        }
        (Value::Number(a), Value::Number(b)) => {
            if a.as_f64() == b.as_f64() {
                None
            } else {
                Some(path.to_string())
            }
        }
        (a, b) if a == b => None,
        _ => Some(path.to_string()),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.keys().all(|k| k.starts_with('@')),
    }
}
