//! CLI argument parsing using clap

use clap::Parser;
use std::path::PathBuf;

/// Convert XML documents into metrics using XPath 3.1 queries
#[derive(Parser, Debug)]
#[command(name = "xmlmetrics")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # One metric per <server>, flattening each server's subtree
    xmlmetrics inventory.xml -n server -q "//server" --array -t name

    # Metric name taken from the document
    xmlmetrics "reports/*.xml" -q "//sensor" --measurement "/report/@site"

    # Fold all selected elements into one metric, as JSON
    cat status.xml | xmlmetrics -n status -q "/status/*" --merge-nodes -o json

    # Settings from a config file, flags override
    xmlmetrics data.xml --config xmlmetrics.toml --tag-node
"#)]
pub struct Args {
    /// Files to convert (supports glob patterns like "data/**/*.xml"); reads stdin when empty
    #[arg()]
    pub files: Vec<String>,

    /// Configuration file (.toml, .yaml or .yml)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Metric name
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// XPath 3.1 query selecting the root elements (default: "//")
    #[arg(short = 'q', long = "query")]
    pub query: Option<String>,

    /// XPath query resolving the metric name from the document
    #[arg(short = 'm', long = "measurement")]
    pub measurement: Option<String>,

    /// Element or attribute name to emit as a tag (repeatable)
    #[arg(short = 't', long = "tag-key")]
    pub tag_keys: Vec<String>,

    /// Tag added to every metric, as key=value (repeatable)
    #[arg(long = "default-tag", value_parser = parse_key_value)]
    pub default_tags: Vec<(String, String)>,

    /// One metric per selected element, including its descendants
    #[arg(long = "array")]
    pub array: bool,

    /// Fold all selected elements into a single metric (object mode)
    #[arg(long = "merge-nodes")]
    pub merge_nodes: bool,

    /// Tag each metric with the selected element's name (xml_node_name)
    #[arg(long = "tag-node")]
    pub tag_node: bool,

    /// Output format: line (default), json, count
    #[arg(short = 'o', long = "output", default_value = "line")]
    pub output: String,

    /// Number of parallel workers
    #[arg(short = 'c', long = "concurrency")]
    pub concurrency: Option<usize>,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a `key=value` pair; both sides must be non-empty
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        Some((key, "")) if !key.is_empty() => Err(format!("tag '{}' has an empty value", key)),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}
