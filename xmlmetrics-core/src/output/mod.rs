//! Output formatting for converted metrics
//!
//! Supports multiple output formats:
//! - line: InfluxDB line protocol, one metric per line
//! - json: one JSON object per metric per line
//! - count: Number of metrics

mod formatter;

pub use formatter::{format_metric, format_metrics, OutputFormat};
