//! Output formatters for different output modes

use serde::Serialize;
use strum_macros::{Display, EnumString, VariantNames};

use crate::metric::{Fields, Metric, Tags};
use crate::value::FieldValue;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// InfluxDB line protocol
    Line,
    /// One JSON object per metric
    Json,
    /// Number of metrics
    Count,
}

/// JSON output structure, timestamp in Unix seconds
#[derive(Serialize)]
struct JsonMetric<'a> {
    fields: &'a Fields,
    name: &'a str,
    tags: &'a Tags,
    timestamp: i64,
}

/// Format metrics according to the specified format
pub fn format_metrics(metrics: &[Metric], format: OutputFormat) -> String {
    match format {
        OutputFormat::Count => format!("{}\n", metrics.len()),
        _ => metrics
            .iter()
            .filter_map(|m| format_metric(m, format))
            .map(|line| line + "\n")
            .collect(),
    }
}

/// Format a single metric without a trailing newline
///
/// Returns `None` when the metric has nothing serializable in the chosen
/// format (line protocol needs at least one finite field).
pub fn format_metric(metric: &Metric, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Line => format_line(metric),
        OutputFormat::Json => format_json(metric),
        OutputFormat::Count => None,
    }
}

fn format_line(metric: &Metric) -> Option<String> {
    let fields: Vec<String> = metric
        .fields()
        .iter()
        .filter_map(|(key, value)| {
            format_field_value(value).map(|v| format!("{}={}", escape_key(key), v))
        })
        .collect();

    if fields.is_empty() {
        log::warn!("metric {:?} has no serializable fields, skipping", metric.name());
        return None;
    }

    let mut line = escape_name(metric.name());
    for (key, value) in metric.tags() {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }
    line.push(' ');
    line.push_str(&fields.join(","));
    line.push(' ');
    line.push_str(&metric.timestamp().timestamp_nanos_opt().unwrap_or_default().to_string());

    Some(line)
}

fn format_field_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Integer(i) => Some(format!("{}i", i)),
        FieldValue::Float(f) if f.is_finite() => Some(f.to_string()),
        FieldValue::Float(_) => None,
        FieldValue::Boolean(b) => Some(b.to_string()),
        FieldValue::String(s) => Some(format!("\"{}\"", escape_string(s))),
    }
}

fn format_json(metric: &Metric) -> Option<String> {
    let json = JsonMetric {
        fields: metric.fields(),
        name: metric.name(),
        tags: metric.tags(),
        timestamp: metric.timestamp().timestamp(),
    };
    match serde_json::to_string(&json) {
        Ok(s) => Some(s),
        Err(e) => {
            log::warn!("metric {:?} could not be serialized: {}", metric.name(), e);
            None
        }
    }
}

/// Escape a measurement name: whitespace controls, commas and spaces
fn escape_name(s: &str) -> String {
    escape_with(s, &[',', ' '])
}

/// Escape a tag key, tag value or field key: also equals signs
fn escape_key(s: &str) -> String {
    escape_with(s, &[',', ' ', '='])
}

fn escape_with(s: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{0c}' => out.push_str("\\f"),
            c if specials.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Escape a string field value: backslashes and double quotes
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
