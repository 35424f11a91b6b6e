//! Tree values
//!
//! A `Node` is a dynamically shaped tree, the common currency between a
//! driver, the transformation pipeline and the validation stages. Objects use
//! a `BTreeMap` so iteration (and therefore rendering and walking) is always
//! in lexicographic key order.
//!
//! A node's *type tag* is the string stored under [`TYPE_KEY`] in an object.
//! Nodes without a tag (scalars, arrays, untyped objects) are still walked.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key holding the type tag of an object node
pub const TYPE_KEY: &str = "@type";
/// Key holding the source token of an annotated node
pub const TOKEN_KEY: &str = "@token";
/// Key holding the positional information of an annotated node
pub const POS_KEY: &str = "@pos";
/// Key holding the roles of an annotated node
pub const ROLE_KEY: &str = "@role";

/// A tree value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Node {
    /// Absent value
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// String scalar
    String(String),
    /// Ordered list of nodes
    Array(Vec<Node>),
    /// Keyed node; keys are kept sorted
    Object(BTreeMap<String, Node>),
}

impl Node {
    /// Build an object node from key/value pairs
    pub fn object<K, I>(fields: I) -> Node
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build an object node carrying a type tag plus the given fields
    pub fn typed<K, I>(tag: &str, fields: I) -> Node
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        let mut map: BTreeMap<String, Node> =
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        map.insert(TYPE_KEY.to_string(), Node::String(tag.to_string()));
        Node::Object(map)
    }

    /// Type tag of this node, if it is an object carrying a string `@type`
    pub fn type_of(&self) -> Option<&str> {
        match self {
            Node::Object(map) => match map.get(TYPE_KEY) {
                Some(Node::String(tag)) if !tag.is_empty() => Some(tag.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Field lookup on object nodes
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Mutable field lookup on object nodes
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self {
            Node::Object(map) => map.get_mut(key),
            _ => None,
        }
    }

    /// String value, if this is a string node
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, if this is an integer node
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Object map, if this is an object node
    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Direct children in walk order: array elements by index, object
    /// values by key.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        match self {
            Node::Array(items) => Box::new(items.iter()),
            Node::Object(map) => Box::new(map.values()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Pre-order walk over this node and all descendants.
    ///
    /// The walk borrows the tree immutably and can be restarted by calling
    /// this method again; two walks over the same tree always yield the same
    /// sequence.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Total number of nodes in the tree, including this one
    pub fn size(&self) -> usize {
        self.pre_order().count()
    }

    /// Convert into a `serde_json::Value`
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Int(v) => Value::from(*v),
            Node::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(v) => Node::Int(v),
                None => n.as_f64().map(Node::Float).unwrap_or(Node::Null),
            },
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Int(v)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

/// Pre-order iterator over a borrowed tree
///
/// Produced by [`Node::pre_order`]. Children are visited in the same order as
/// [`Node::children`].
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        match node {
            Node::Array(items) => self.stack.extend(items.iter().rev()),
            Node::Object(map) => self.stack.extend(map.values().rev()),
            _ => {}
        }
        Some(node)
    }
}
