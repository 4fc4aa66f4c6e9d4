//! Read-only inspection helpers for xot element nodes
//!
//! These cover the node operations the conversion needs: element name,
//! own text, attributes in document order, descendant elements. Names are
//! always local names; namespace prefixes are ignored.

use xot::{Xot, Node as XotNode};

/// Get the local name of an element node
pub fn element_name(xot: &Xot, node: XotNode) -> Option<&str> {
    xot.element(node).map(|element| xot.local_name_str(element.name()))
}

/// Whether the node is an element
pub fn is_element(xot: &Xot, node: XotNode) -> bool {
    xot.element(node).is_some()
}

/// Character data directly following the start tag
///
/// Consecutive text children are concatenated up to the first child that
/// is not text (element, comment or processing instruction). Text after a
/// child element is not part of the node's own text.
pub fn own_text(xot: &Xot, node: XotNode) -> String {
    let mut text = String::new();
    for child in xot.children(node) {
        match xot.text_str(child) {
            Some(t) => text.push_str(t),
            None => break,
        }
    }
    text
}

/// Attributes as (local name, value) pairs in document order
pub fn attributes(xot: &Xot, node: XotNode) -> Vec<(String, String)> {
    xot.attributes(node)
        .iter()
        .map(|(name_id, value)| (xot.local_name_str(name_id).to_string(), value.to_string()))
        .collect()
}

/// Get an attribute value from an element by local name
pub fn attribute(xot: &Xot, node: XotNode, attr_name: &str) -> Option<String> {
    let attrs = xot.attributes(node);
    for (name_id, value) in attrs.iter() {
        if xot.local_name_str(name_id) == attr_name {
            return Some(value.to_string());
        }
    }
    None
}

/// All descendant elements of `node` in document order, excluding `node`
pub fn descendant_elements(xot: &Xot, node: XotNode) -> Vec<XotNode> {
    xot.descendants(node)
        .filter(|&n| n != node && is_element(xot, n))
        .collect()
}
