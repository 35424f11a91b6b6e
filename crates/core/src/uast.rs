//! Built-in semantic node types
//!
//! These are the typed representations of the shared semantic vocabulary.
//! Semantic trees carry them as object nodes tagged `uast:<Name>`; the
//! conformance scan uses [`register_all`] to check that every such node
//! converts into its representation without losing fields.

use crate::node::Node;
use crate::registry::TypeRegistry;
use serde::{Deserialize, Serialize};

/// Namespace of the built-in semantic types
pub const NAMESPACE: &str = "uast";

/// Full type tag for a built-in type name
pub fn tag(name: &str) -> String {
    format!("{}:{}", NAMESPACE, name)
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Identifier {
    /// Identifier text
    pub name: String,
}

/// Identifier made of several parts (`a.b.c`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QualifiedIdentifier {
    /// Parts, outermost first
    pub names: Vec<Identifier>,
}

/// String literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UString {
    /// Unescaped value
    pub value: String,
    /// Literal format hint, empty for the language default
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

/// Boolean literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bool {
    /// Literal value
    pub value: bool,
}

/// Comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Comment {
    /// Comment text without markers and surrounding whitespace
    pub text: String,
    /// Whitespace between the opening marker and the text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
    /// Whitespace between the text and the closing marker
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suffix: String,
    /// Common indentation stripped from every line
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tab: String,
    /// Whether this is a block comment
    #[serde(default, skip_serializing_if = "is_false")]
    pub block: bool,
}

/// Sequence of statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    /// Statements in source order
    #[serde(default)]
    pub statements: Vec<Node>,
}

/// Source position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset from the start of the source
    pub offset: u32,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub col: u32,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Register every built-in type in `registry`
pub fn register_all(registry: &mut TypeRegistry) {
    registry.register::<Identifier>(tag("Identifier"));
    registry.register::<QualifiedIdentifier>(tag("QualifiedIdentifier"));
    registry.register::<UString>(tag("String"));
    registry.register::<Bool>(tag("Bool"));
    registry.register::<Comment>(tag("Comment"));
    registry.register::<Block>(tag("Block"));
    registry.register::<Position>(tag("Position"));
}
