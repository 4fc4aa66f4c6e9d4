//! Metric record type

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::value::FieldValue;

/// Tag name to string value, iterated in key order
pub type Tags = BTreeMap<String, String>;

/// Field name to typed value, iterated in key order
pub type Fields = BTreeMap<String, FieldValue>;

/// Errors raised when a metric cannot be constructed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("missing metric name")]
    MissingName,
}

/// A single converted record: name, tags, fields and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    name: String,
    tags: Tags,
    fields: Fields,
    timestamp: DateTime<Utc>,
}

impl Metric {
    /// Build a metric, rejecting an empty name
    ///
    /// Tags with an empty key or value carry no information and are dropped.
    pub fn new(
        name: impl Into<String>,
        mut tags: Tags,
        fields: Fields,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, MetricError> {
        let name = name.into();
        if name.is_empty() {
            return Err(MetricError::MissingName);
        }
        tags.retain(|k, v| !k.is_empty() && !v.is_empty());

        Ok(Metric { name, tags, fields, timestamp })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}
