//! Single node and single value resolution for dynamic metric names

use super::{CompiledQuery, XmlDocument, XPathError};
use once_cell::sync::Lazy;
use regex::Regex;
use xot::Node as XotNode;

use crate::parser::classify::trim_empty_chars;
use crate::xot_node;

// Query ending in an attribute step, e.g. `/metrics/@name`
static ATTR_SELECTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*/@(?P<attr>.+)$").expect("attribute selector regex is valid"));

/// Evaluate `query` and return its first element
///
/// A query that selects nothing is an error.
pub fn select_single_node(doc: &mut XmlDocument, query: &str) -> Result<XotNode, XPathError> {
    let compiled = CompiledQuery::compile(query)?;
    compiled
        .select_first(doc)?
        .ok_or_else(|| XPathError::NoMatch(query.to_string()))
}

/// Resolve `query` to a single non-empty string
///
/// A query ending in `/@name` reads that attribute from the first element
/// selected by the rest of the path (a missing attribute reads as empty).
/// Any other query reads the own text of its first element. The value is
/// returned untrimmed, but must not be empty after trimming.
pub fn select_single_value(doc: &mut XmlDocument, query: &str) -> Result<String, XPathError> {
    let value = match ATTR_SELECTOR.captures(query) {
        Some(caps) => {
            let attr_name = &caps["attr"];
            let node_path = query
                .strip_suffix(&format!("/@{}", attr_name))
                .unwrap_or(query);

            let node = select_single_node(doc, node_path)?;
            xot_node::attribute(doc.xot(), node, attr_name).unwrap_or_default()
        }
        None => {
            let node = select_single_node(doc, query)?;
            xot_node::own_text(doc.xot(), node)
        }
    };

    if trim_empty_chars(&value).is_empty() {
        return Err(XPathError::EmptyValue(query.to_string()));
    }

    log::debug!("query {:?} resolved to {:?}", query, value);
    Ok(value)
}
