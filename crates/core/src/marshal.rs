//! Canonical textual rendering of trees
//!
//! Golden artifacts are compared byte-for-byte, so goldens and the text they
//! are compared against must come from the same routine. Rendering is
//! pretty-printed JSON with two-space indentation, object keys in
//! lexicographic order (guaranteed by [`Node`]'s `BTreeMap`), and a single
//! trailing newline.

use crate::error::Result;
use crate::node::Node;
use serde::Serialize;

/// Render a tree as canonical text
pub fn to_text(node: &Node) -> Result<String> {
    let mut text = serde_json::to_string_pretty(node)?;
    text.push('\n');
    Ok(text)
}

/// Parse canonical text back into a tree
pub fn from_text(text: &str) -> Result<Node> {
    Ok(serde_json::from_str(text)?)
}

/// Render the document consumed by tree viewers: language, source code and
/// the tree itself
pub fn to_viewer_json(lang: &str, code: &str, node: &Node) -> Result<String> {
    #[derive(Serialize)]
    struct ViewerDocument<'a> {
        lang: &'a str,
        code: &'a str,
        uast: &'a Node,
    }

    let mut text = serde_json::to_string_pretty(&ViewerDocument {
        lang,
        code,
        uast: node,
    })?;
    text.push('\n');
    Ok(text)
}
