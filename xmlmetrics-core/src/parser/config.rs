//! Configuration for XML to metric conversion

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::metric::Tags;
use crate::xpath::DEFAULT_QUERY;

/// Configuration for an [`XmlParser`](super::XmlParser)
///
/// Field names follow the telemetry agent's parser options, so a
/// `[[inputs.*]]`-style table deserializes directly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Name of every emitted metric unless `measurement` resolves one
    pub metric_name: String,

    /// Element and attribute names that become tags instead of fields
    pub tag_keys: BTreeSet<String>,

    /// Object mode only: fold all selected elements into one metric
    #[serde(rename = "xml_merge_nodes")]
    pub merge_nodes: bool,

    /// Add an `xml_node_name` tag holding the selected element's name
    #[serde(rename = "xml_tag_node")]
    pub tag_node: bool,

    /// Array mode: one metric per selected element, flattening its subtree
    #[serde(rename = "xml_array")]
    pub parse_array: bool,

    /// XPath selecting the root elements
    #[serde(rename = "xml_query")]
    pub query: String,

    /// XPath resolving the metric name from the document
    #[serde(rename = "xml_measurement")]
    pub measurement: Option<String>,

    /// Tags added to every emitted metric, overriding computed ones
    pub default_tags: Tags,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            metric_name: String::new(),
            tag_keys: BTreeSet::new(),
            merge_nodes: false,
            tag_node: false,
            parse_array: false,
            query: DEFAULT_QUERY.to_string(),
            measurement: None,
            default_tags: Tags::new(),
        }
    }
}

impl ParserConfig {
    /// Create a configuration emitting metrics named `metric_name`
    pub fn new(metric_name: impl Into<String>) -> Self {
        ParserConfig {
            metric_name: metric_name.into(),
            ..Default::default()
        }
    }

    pub fn with_tag_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_merge_nodes(mut self, merge: bool) -> Self {
        self.merge_nodes = merge;
        self
    }

    pub fn with_tag_node(mut self, tag_node: bool) -> Self {
        self.tag_node = tag_node;
        self
    }

    pub fn with_array(mut self, array: bool) -> Self {
        self.parse_array = array;
        self
    }

    /// Set the selection query; an empty string restores the default
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.is_empty() { DEFAULT_QUERY.to_string() } else { query };
        self
    }

    /// Set the dynamic name query; an empty string disables it
    pub fn with_measurement(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.measurement = if query.is_empty() { None } else { Some(query) };
        self
    }

    pub fn with_default_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_tags.insert(key.into(), value.into());
        self
    }

    pub fn with_default_tags(mut self, tags: Tags) -> Self {
        self.default_tags = tags;
        self
    }

    /// The dynamic name query, if one is configured and non-empty
    pub fn measurement_query(&self) -> Option<&str> {
        self.measurement.as_deref().filter(|q| !q.is_empty())
    }
}
