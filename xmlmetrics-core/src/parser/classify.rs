//! Tag/field classification of a single element
//!
//! An element's own text is keyed by its element name, each attribute by
//! the attribute name. Keys listed as tag keys become string tags, all
//! others become coerced fields. Values that are blank after trimming are
//! dropped.

use std::collections::BTreeSet;
use xot::{Xot, Node as XotNode};

use crate::metric::{Fields, Tags};
use crate::value::coerce;
use crate::xot_node;

/// Name of the synthetic tag holding the selected element's name
pub const NODE_NAME_TAG: &str = "xml_node_name";

/// Characters ignored when deciding whether a value is blank
const EMPTY_CHARS: &[char] = &['\n', '\r', '\t', ' '];

/// Trim newlines, carriage returns, tabs and spaces from both ends
pub fn trim_empty_chars(s: &str) -> &str {
    s.trim_matches(EMPTY_CHARS)
}

/// Rules deciding how an element's values are classified
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRules<'a> {
    /// Names that become tags instead of fields
    pub tag_keys: &'a BTreeSet<String>,
    /// Add the [`NODE_NAME_TAG`] tag for selected elements
    pub tag_node: bool,
}

impl<'a> ClassificationRules<'a> {
    pub fn new(tag_keys: &'a BTreeSet<String>, tag_node: bool) -> Self {
        ClassificationRules { tag_keys, tag_node }
    }

    /// Check if a name is configured as a tag key
    pub fn is_tag(&self, name: &str) -> bool {
        self.tag_keys.contains(name)
    }

    /// Insert `value` under `key` as a tag or a coerced field
    ///
    /// Blankness is judged on the trimmed value; the stored value is the
    /// original text.
    fn classify_value(&self, key: &str, value: &str, tags: &mut Tags, fields: &mut Fields) {
        if trim_empty_chars(value).is_empty() {
            return;
        }
        if self.is_tag(key) {
            tags.insert(key.to_string(), value.to_string());
        } else {
            let value = coerce(value);
            log::trace!("field {:?} coerced to {}", key, value.kind());
            fields.insert(key.to_string(), value);
        }
    }
}

/// Split an element's own text and attributes into fresh tag and field maps
///
/// Descendants are not visited.
pub fn classify(xot: &Xot, node: XotNode, rules: &ClassificationRules<'_>) -> (Tags, Fields) {
    let mut tags = Tags::new();
    let mut fields = Fields::new();

    let Some(name) = xot_node::element_name(xot, node) else {
        return (tags, fields);
    };

    let text = xot_node::own_text(xot, node);
    rules.classify_value(name, &text, &mut tags, &mut fields);

    for (attr_name, attr_value) in xot_node::attributes(xot, node) {
        rules.classify_value(&attr_name, &attr_value, &mut tags, &mut fields);
    }

    log::trace!("classified <{}>: {} tag(s), {} field(s)", name, tags.len(), fields.len());
    (tags, fields)
}
