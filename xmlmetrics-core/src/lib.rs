//! xmlmetrics-core: XML to metric conversion library
//!
//! This library provides:
//! - XPath 3.1 selection of root elements (xee-xpath over xot trees)
//! - Tag/field classification of element text and attributes
//! - Array and object conversion strategies
//! - Typed coercion of field values
//! - Line protocol and JSON output

pub mod merge;
pub mod metric;
pub mod output;
pub mod parser;
pub mod value;
pub mod xot_node;
pub mod xpath;

pub use metric::{Fields, Metric, MetricError, Tags};
pub use output::{format_metric, format_metrics, OutputFormat};
pub use parser::{ParseError, ParserConfig, XmlParser, NODE_NAME_TAG};
pub use value::{coerce, FieldValue};
pub use xpath::{CompiledQuery, XPathError, XmlDocument};
