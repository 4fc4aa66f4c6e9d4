//! Document loading and compiled query evaluation

use super::XPathError;
use std::borrow::Cow;
use xee_xpath::{DocumentHandle, Documents, Queries, Query, query::SequenceQuery};
use xot::{Xot, Node as XotNode};

use crate::xot_node;

/// Selection used when none is configured: every element of the document
pub const DEFAULT_QUERY: &str = "//";

/// Complete path-style queries for XPath 3.1
///
/// An empty query selects everything. A trailing `//` ("all descendants")
/// is not valid XPath on its own and gets a `*` name test appended.
pub fn normalize_query(query: &str) -> String {
    let query = query.trim();
    let query = if query.is_empty() { DEFAULT_QUERY } else { query };

    if query.ends_with("//") {
        format!("{}*", query)
    } else {
        query.to_string()
    }
}

/// Remove the `<!DOCTYPE ...>` declaration from the prolog, if present
///
/// Only the prolog is scanned: the XML declaration, processing instructions,
/// comments and whitespace are skipped until the doctype or the first other
/// markup. An internal subset (`[...]`) is removed along with it. An
/// unterminated declaration is left in place for the parser to report.
pub fn strip_doctype(xml: &str) -> Cow<'_, str> {
    match doctype_span(xml.as_bytes()) {
        Some((start, end)) => {
            log::debug!("dropping document type declaration ({} bytes)", end - start);
            let mut stripped = String::with_capacity(xml.len() - (end - start));
            stripped.push_str(&xml[..start]);
            stripped.push_str(&xml[end..]);
            Cow::Owned(stripped)
        }
        None => Cow::Borrowed(xml),
    }
}

/// Byte range of the doctype declaration within the prolog
fn doctype_span(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut pos = if bytes.starts_with("\u{feff}".as_bytes()) { 3 } else { 0 };

    loop {
        while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r') {
            pos += 1;
        }
        let rest = &bytes[pos..];

        if rest.starts_with(b"<?") {
            pos += find(rest, b"?>")? + 2;
        } else if rest.starts_with(b"<!--") {
            pos += find(rest, b"-->")? + 3;
        } else if rest.starts_with(b"<!DOCTYPE") {
            let end = doctype_end(bytes, pos + b"<!DOCTYPE".len())?;
            return Some((pos, end));
        } else {
            return None;
        }
    }
}

/// Position just past the `>` closing a doctype, honouring quoted literals
/// and the bracketed internal subset
fn doctype_end(bytes: &[u8], mut pos: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut in_subset = false;

    while pos < bytes.len() {
        let b = bytes[pos];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            pos += 1;
            continue;
        }

        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' if !in_subset => in_subset = true,
            b']' if in_subset => in_subset = false,
            b'<' if in_subset && bytes[pos..].starts_with(b"<!--") => {
                pos += find(&bytes[pos..], b"-->")? + 3;
                continue;
            }
            b'>' if !in_subset => return Some(pos + 1),
            _ => {}
        }
        pos += 1;
    }

    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// A parsed XML document ready for querying
///
/// Owns the xee-xpath `Documents` store, so the tree lives exactly as long
/// as this value.
pub struct XmlDocument {
    documents: Documents,
    handle: DocumentHandle,
}

impl XmlDocument {
    /// Parse raw bytes as a UTF-8 XML document
    pub fn parse(bytes: &[u8]) -> Result<Self, XPathError> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| XPathError::XmlParse(e.to_string()))?;
        Self::parse_str(xml)
    }

    /// Parse an XML string
    ///
    /// A document type declaration in the prolog is dropped before parsing;
    /// the tree builder does not accept DTDs.
    pub fn parse_str(xml: &str) -> Result<Self, XPathError> {
        let xml = strip_doctype(xml);
        let mut documents = Documents::new();
        let handle = documents
            .add_string(
                "file:///input".try_into().expect("static document URI is valid"),
                &xml,
            )
            .map_err(|e| XPathError::XmlParse(e.to_string()))?;

        Ok(XmlDocument { documents, handle })
    }

    /// The underlying tree, for node inspection
    pub fn xot(&self) -> &Xot {
        self.documents.xot()
    }
}

/// A compiled XPath expression, bound to the query text it came from
pub struct CompiledQuery {
    source: String,
    query: SequenceQuery,
}

impl CompiledQuery {
    /// Normalize and compile a query
    pub fn compile(query: &str) -> Result<Self, XPathError> {
        let normalized = normalize_query(query);
        let queries = Queries::default();
        let compiled = queries
            .sequence(normalized.as_str())
            .map_err(|e| XPathError::Compile {
                query: query.to_string(),
                message: e.to_string(),
            })?;

        Ok(CompiledQuery {
            source: query.to_string(),
            query: compiled,
        })
    }

    /// The query text as configured, before normalization
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against the document node, returning element nodes in
    /// document order
    ///
    /// Atomic values and non-element nodes in the result are skipped.
    pub fn select(&self, doc: &mut XmlDocument) -> Result<Vec<XotNode>, XPathError> {
        let results = self
            .query
            .execute(&mut doc.documents, doc.handle)
            .map_err(|e: xee_xpath::error::Error| XPathError::Execute {
                query: self.source.clone(),
                message: e.to_string(),
            })?;

        let xot = doc.documents.xot();
        let mut nodes = Vec::new();
        let mut skipped = 0usize;

        for item in results.iter() {
            match item {
                xee_xpath::Item::Node(node) if xot_node::is_element(xot, node) => nodes.push(node),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            log::debug!("query {:?}: skipped {} non-element item(s)", self.source, skipped);
        }

        Ok(nodes)
    }

    /// Evaluate and return the first element, if any
    pub fn select_first(&self, doc: &mut XmlDocument) -> Result<Option<XotNode>, XPathError> {
        Ok(self.select(doc)?.into_iter().next())
    }
}
