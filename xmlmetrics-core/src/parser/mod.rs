//! XML document to metric conversion
//!
//! [`XmlParser`] holds an immutable [`ParserConfig`]. Each call parses the
//! document, selects root elements with the configured XPath query,
//! optionally resolves the metric name from the document, and builds
//! metrics in array or object mode.

pub mod builder;
pub mod classify;
pub mod config;

pub use builder::BuildContext;
pub use classify::{ClassificationRules, NODE_NAME_TAG};
pub use config::ParserConfig;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::metric::{Metric, MetricError, Tags};
use crate::xpath::{select_single_value, CompiledQuery, XmlDocument, XPathError};

/// Errors that can occur while converting a document
#[derive(Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    XPath(#[from] XPathError),
    #[error("Failed to build metric: {0}")]
    Metric(#[from] MetricError),
    #[error("no metric in line")]
    NoMetric,
}

/// Converts XML documents into metrics
///
/// Parsing takes `&self`: the metric name resolved from the document is a
/// per-call value, so one parser can be shared across threads.
#[derive(Debug, Clone)]
pub struct XmlParser {
    config: ParserConfig,
}

impl XmlParser {
    pub fn new(config: ParserConfig) -> Self {
        XmlParser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Replace the tags added to every emitted metric
    pub fn set_default_tags(&mut self, tags: Tags) {
        self.config.default_tags = tags;
    }

    /// Convert a document, timestamping metrics with the current UTC time
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<Metric>, ParseError> {
        self.parse_at(bytes, Utc::now())
    }

    /// Convert a document, timestamping every metric with `timestamp`
    ///
    /// Either all metrics are returned or an error; there are no partial
    /// results.
    pub fn parse_at(&self, bytes: &[u8], timestamp: DateTime<Utc>) -> Result<Vec<Metric>, ParseError> {
        let mut doc = XmlDocument::parse(bytes)?;

        let selection = CompiledQuery::compile(&self.config.query)?;
        let roots = selection.select(&mut doc)?;
        log::debug!("query {:?} selected {} element(s)", selection.source(), roots.len());

        let name = self.resolve_name(&mut doc)?;

        if roots.is_empty() {
            return Ok(Vec::new());
        }

        let ctx = BuildContext {
            name: &name,
            timestamp,
            rules: ClassificationRules::new(&self.config.tag_keys, self.config.tag_node),
            default_tags: &self.config.default_tags,
        };

        let metrics = if self.config.parse_array {
            builder::parse_as_array(doc.xot(), &roots, &ctx)?
        } else {
            builder::parse_as_object(doc.xot(), &roots, &ctx, self.config.merge_nodes)?
        };

        log::debug!("built {} metric(s) named {:?}", metrics.len(), name);
        Ok(metrics)
    }

    /// Convert a document and return its first metric
    ///
    /// Same as taking the head of [`parse`](Self::parse); fails with
    /// [`ParseError::NoMetric`] when the document yields nothing.
    pub fn parse_line(&self, line: &str) -> Result<Metric, ParseError> {
        self.parse(line.as_bytes())?
            .into_iter()
            .next()
            .ok_or(ParseError::NoMetric)
    }

    /// Metric name for this call: resolved from the document when a
    /// measurement query is configured, the configured name otherwise
    fn resolve_name(&self, doc: &mut XmlDocument) -> Result<String, XPathError> {
        match self.config.measurement_query() {
            Some(query) => select_single_value(doc, query),
            None => Ok(self.config.metric_name.clone()),
        }
    }
}
