//! Metric construction from selected root elements
//!
//! Two strategies:
//! - array mode: one metric per root element, flattening its whole subtree
//! - object mode: only each root element's own values, either one metric
//!   per element or, with node merging, a single metric for the document

use chrono::{DateTime, Utc};
use xot::{Xot, Node as XotNode};

use super::classify::{classify, ClassificationRules, NODE_NAME_TAG};
use crate::merge::{merge_into, merge_owned};
use crate::metric::{Fields, Metric, MetricError, Tags};
use crate::xot_node;

/// Per-call inputs shared by both strategies
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Metric name for this call (configured or resolved from the document)
    pub name: &'a str,
    pub timestamp: DateTime<Utc>,
    pub rules: ClassificationRules<'a>,
    /// Applied last to every emitted metric
    pub default_tags: &'a Tags,
}

impl BuildContext<'_> {
    fn emit(&self, mut tags: Tags, fields: Fields) -> Result<Metric, MetricError> {
        merge_into(&mut tags, self.default_tags);
        Metric::new(self.name, tags, fields, self.timestamp)
    }

    fn tag_node_name(&self, xot: &Xot, node: XotNode, tags: &mut Tags) {
        if !self.rules.tag_node {
            return;
        }
        if let Some(name) = xot_node::element_name(xot, node) {
            tags.insert(NODE_NAME_TAG.to_string(), name.to_string());
        }
    }
}

/// One metric per root element, built from its descendants and itself
///
/// Descendants are merged in document order and the root element last, so
/// the root's own values override same-named values from its subtree.
pub fn parse_as_array(
    xot: &Xot,
    nodes: &[XotNode],
    ctx: &BuildContext<'_>,
) -> Result<Vec<Metric>, MetricError> {
    let mut results = Vec::with_capacity(nodes.len());

    for &node in nodes {
        let mut xml_tags = Tags::new();
        let mut xml_fields = Fields::new();

        let subtree = xot_node::descendant_elements(xot, node)
            .into_iter()
            .chain(std::iter::once(node));
        for element in subtree {
            let (tags, fields) = classify(xot, element, &ctx.rules);
            xml_tags = merge_owned(xml_tags, tags);
            xml_fields = merge_owned(xml_fields, fields);
        }

        ctx.tag_node_name(xot, node, &mut xml_tags);
        results.push(ctx.emit(xml_tags, xml_fields)?);
    }

    Ok(results)
}

/// Metrics from each root element's own text and attributes
///
/// Without `merge_nodes` every root element yields one metric. With it, all
/// root elements fold into a single metric, later elements overwriting
/// same-named tags and fields of earlier ones (including the node name tag).
pub fn parse_as_object(
    xot: &Xot,
    nodes: &[XotNode],
    ctx: &BuildContext<'_>,
    merge_nodes: bool,
) -> Result<Vec<Metric>, MetricError> {
    let mut results = Vec::new();
    let mut xml_tags = Tags::new();
    let mut xml_fields = Fields::new();

    for &node in nodes {
        let (mut tags, fields) = classify(xot, node, &ctx.rules);
        ctx.tag_node_name(xot, node, &mut tags);

        if merge_nodes {
            xml_tags = merge_owned(xml_tags, tags);
            xml_fields = merge_owned(xml_fields, fields);
        } else {
            results.push(ctx.emit(tags, fields)?);
        }
    }

    if merge_nodes && !nodes.is_empty() {
        results.push(ctx.emit(xml_tags, xml_fields)?);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    struct Fixture {
        xot: Xot,
        root: XotNode,
    }

    impl Fixture {
        fn new(xml: &str) -> Self {
            let mut xot = Xot::new();
            let doc = xot.parse(xml).unwrap();
            let root = xot.document_element(doc).unwrap();
            Fixture { xot, root }
        }

        fn children(&self) -> Vec<XotNode> {
            self.xot
                .children(self.root)
                .filter(|&n| xot_node::is_element(&self.xot, n))
                .collect()
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    fn ctx<'a>(keys: &'a BTreeSet<String>, defaults: &'a Tags, tag_node: bool) -> BuildContext<'a> {
        BuildContext {
            name: "xml",
            timestamp: ts(),
            rules: ClassificationRules::new(keys, tag_node),
            default_tags: defaults,
        }
    }

    #[test]
    fn test_array_self_overrides_descendants() {
        let f = Fixture::new(r#"<root x="1"><child x="2"/></root>"#);
        let (keys, defaults) = (BTreeSet::new(), Tags::new());
        let metrics = parse_as_array(&f.xot, &[f.root], &ctx(&keys, &defaults, false)).unwrap();

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].field("x"), Some(&FieldValue::Integer(1)));
        assert_eq!(metrics[0].name(), "xml");
        assert_eq!(metrics[0].timestamp(), ts());
    }

    #[test]
    fn test_array_later_descendants_win() {
        let f = Fixture::new(r#"<root><a v="1"/><b v="2"><c v="3"/></b></root>"#);
        let (keys, defaults) = (BTreeSet::new(), Tags::new());
        let metrics = parse_as_array(&f.xot, &[f.root], &ctx(&keys, &defaults, false)).unwrap();
        assert_eq!(metrics[0].field("v"), Some(&FieldValue::Integer(3)));
    }

    #[test]
    fn test_array_flattens_subtree() {
        let f = Fixture::new(
            "<root><cpu><host>a</host><usage>10</usage></cpu><cpu><host>b</host><usage>20</usage></cpu></root>",
        );
        let keys: BTreeSet<String> = ["host".to_string()].into();
        let defaults = Tags::new();
        let metrics = parse_as_array(&f.xot, &f.children(), &ctx(&keys, &defaults, true)).unwrap();

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].tag("host"), Some("a"));
        assert_eq!(metrics[0].field("usage"), Some(&FieldValue::Integer(10)));
        assert_eq!(metrics[0].tag(NODE_NAME_TAG), Some("cpu"));
        // maps are reset between root elements
        assert_eq!(metrics[1].tag("host"), Some("b"));
        assert_eq!(metrics[1].field("usage"), Some(&FieldValue::Integer(20)));
    }

    #[test]
    fn test_object_ignores_descendants() {
        let f = Fixture::new(r#"<root x="1"><child x="2" y="3"/></root>"#);
        let (keys, defaults) = (BTreeSet::new(), Tags::new());
        let metrics = parse_as_object(&f.xot, &[f.root], &ctx(&keys, &defaults, false), false).unwrap();

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].field("x"), Some(&FieldValue::Integer(1)));
        assert!(metrics[0].field("y").is_none());
    }

    #[test]
    fn test_object_merge_count() {
        let f = Fixture::new(r#"<root><a x="1" y="1"/><b x="2" z="2"/></root>"#);
        let (keys, defaults) = (BTreeSet::new(), Tags::new());
        let nodes = f.children();

        let separate = parse_as_object(&f.xot, &nodes, &ctx(&keys, &defaults, false), false).unwrap();
        assert_eq!(separate.len(), 2);

        let merged = parse_as_object(&f.xot, &nodes, &ctx(&keys, &defaults, false), true).unwrap();
        assert_eq!(merged.len(), 1);
        let fields = merged[0].fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("x"), Some(&FieldValue::Integer(2)));
        assert_eq!(fields.get("y"), Some(&FieldValue::Integer(1)));
        assert_eq!(fields.get("z"), Some(&FieldValue::Integer(2)));
    }

    #[test]
    fn test_object_merge_keeps_last_node_name() {
        let f = Fixture::new(r#"<root><first a="1"/><second b="2"/></root>"#);
        let (keys, defaults) = (BTreeSet::new(), Tags::new());
        let merged = parse_as_object(&f.xot, &f.children(), &ctx(&keys, &defaults, true), true).unwrap();
        assert_eq!(merged[0].tag(NODE_NAME_TAG), Some("second"));
    }

    #[test]
    fn test_default_tags_win() {
        let f = Fixture::new(r#"<root><a env="dev" v="1"/><b env="test" v="2"/></root>"#);
        let keys: BTreeSet<String> = ["env".to_string()].into();
        let defaults: Tags = [("env".to_string(), "prod".to_string())].into();
        let c = ctx(&keys, &defaults, false);
        let nodes = f.children();

        for metrics in [
            parse_as_array(&f.xot, &nodes, &c).unwrap(),
            parse_as_object(&f.xot, &nodes, &c, false).unwrap(),
            parse_as_object(&f.xot, &nodes, &c, true).unwrap(),
        ] {
            assert!(!metrics.is_empty());
            for metric in &metrics {
                assert_eq!(metric.tag("env"), Some("prod"));
            }
        }
    }

    #[test]
    fn test_no_nodes_no_metrics() {
        let (keys, defaults) = (BTreeSet::new(), Tags::new());
        let xot = Xot::new();
        let c = ctx(&keys, &defaults, false);
        assert!(parse_as_array(&xot, &[], &c).unwrap().is_empty());
        assert!(parse_as_object(&xot, &[], &c, false).unwrap().is_empty());
        assert!(parse_as_object(&xot, &[], &c, true).unwrap().is_empty());
    }

    #[test]
    fn test_empty_name_is_error() {
        let f = Fixture::new(r#"<root v="1"/>"#);
        let (keys, defaults) = (BTreeSet::new(), Tags::new());
        let c = BuildContext { name: "", ..ctx(&keys, &defaults, false) };
        let err = parse_as_array(&f.xot, &[f.root], &c).unwrap_err();
        assert_eq!(err, MetricError::MissingName);
    }
}
