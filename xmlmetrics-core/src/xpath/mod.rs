//! XPath 3.1 query resolution using xee-xpath
//!
//! This module loads XML documents, compiles queries, selects root elements
//! and resolves single values for dynamic metric names.

mod engine;
mod resolve;

pub use engine::{normalize_query, CompiledQuery, XmlDocument, DEFAULT_QUERY};
pub use resolve::{select_single_node, select_single_value};

use thiserror::Error;

/// Errors that can occur while loading documents or evaluating queries
#[derive(Error, Debug)]
pub enum XPathError {
    #[error("Failed to parse XML: {0}")]
    XmlParse(String),
    #[error("Failed to compile XPath {query:?}: {message}")]
    Compile { query: String, message: String },
    #[error("Failed to execute XPath {query:?}: {message}")]
    Execute { query: String, message: String },
    #[error("Query {0:?} must return XML object, but returns nothing")]
    NoMatch(String),
    #[error("Query {0:?} must return value, but returns empty string")]
    EmptyValue(String),
}
