//! Configuration file support
//!
//! Instead of passing many CLI flags, settings can live in a file:
//!
//! ```toml
//! # xmlmetrics.toml
//! metric_name = "server"
//! tag_keys = ["name", "status"]
//! xml_query = "//server"
//! xml_array = true
//!
//! [default_tags]
//! source = "inventory"
//! ```
//!
//! YAML files with the same keys are accepted as well.

use anyhow::{bail, Context, Result};
use std::path::Path;

use xmlmetrics_core::ParserConfig;

use crate::cli::Args;

/// Load a parser configuration, picking the format from the file extension
pub fn load_config(path: &Path) -> Result<ParserConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => from_toml(&content),
        Some("yaml") | Some("yml") => from_yaml(&content),
        _ => bail!(
            "unsupported config file '{}': expected .toml, .yaml or .yml",
            path.display()
        ),
    }
}

/// Parse configuration from a TOML string
pub fn from_toml(content: &str) -> Result<ParserConfig> {
    toml::from_str(content).context("Failed to parse TOML configuration")
}

/// Parse configuration from a YAML string
pub fn from_yaml(content: &str) -> Result<ParserConfig> {
    if content.trim().is_empty() {
        return Ok(ParserConfig::default());
    }
    serde_yaml::from_str(content).context("Failed to parse YAML configuration")
}

/// Build the effective configuration: file settings, then command-line flags
pub fn resolve_config(args: &Args) -> Result<ParserConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ParserConfig::default(),
    };

    if let Some(name) = &args.name {
        config.metric_name = name.clone();
    }
    if let Some(query) = &args.query {
        config = config.with_query(query.as_str());
    }
    if let Some(measurement) = &args.measurement {
        config = config.with_measurement(measurement.as_str());
    }
    config.tag_keys.extend(args.tag_keys.iter().cloned());
    config.default_tags.extend(args.default_tags.iter().cloned());
    config.parse_array |= args.array;
    config.merge_nodes |= args.merge_nodes;
    config.tag_node |= args.tag_node;

    if let Some((key, _)) = config.default_tags.iter().find(|(_, value)| value.is_empty()) {
        bail!("default tag '{}' has an empty value", key);
    }

    if config.metric_name.is_empty() && config.measurement_query().is_none() {
        bail!("a metric name is required: pass --name, --measurement or set metric_name in the config file");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            metric_name = "server"
            tag_keys = ["name"]
            xml_query = "//server"
            xml_array = true

            [default_tags]
            source = "inventory"
        "#;

        let config = from_toml(toml).unwrap();
        assert_eq!(config.metric_name, "server");
        assert!(config.tag_keys.contains("name"));
        assert_eq!(config.query, "//server");
        assert!(config.parse_array);
        assert_eq!(config.default_tags.get("source").map(String::as_str), Some("inventory"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = from_toml(r#"metric_name = "m""#).unwrap();
        assert_eq!(config.query, "//");
        assert!(!config.parse_array);
        assert!(config.measurement.is_none());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "metric_name: sensors\nxml_merge_nodes: true\nxml_measurement: /report/@site\n";
        let config = from_yaml(yaml).unwrap();
        assert_eq!(config.metric_name, "sensors");
        assert!(config.merge_nodes);
        assert_eq!(config.measurement_query(), Some("/report/@site"));
        assert_eq!(from_yaml("").unwrap(), ParserConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "metric_name = \"from_file\"\nxml_tag_node = true").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.metric_name, "from_file");
        assert!(config.tag_node);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "metric_name: from_file\ntag_keys: [host]\nxml_query: //a").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = Args::parse_from([
            "xmlmetrics", "--config", path.as_str(), "-n", "flag", "-t", "dc", "--array",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.metric_name, "flag");
        assert!(config.tag_keys.contains("host") && config.tag_keys.contains("dc"));
        assert_eq!(config.query, "//a");
        assert!(config.parse_array);
    }

    #[test]
    fn test_empty_default_tag_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "metric_name = \"m\"\n\n[default_tags]\nenv = \"\"").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = Args::parse_from(["xmlmetrics", "--config", path.as_str()]);
        let err = resolve_config(&args).unwrap_err();
        assert!(err.to_string().contains("default tag 'env'"));

        assert!(Args::try_parse_from(["xmlmetrics", "-n", "m", "--default-tag", "env="]).is_err());
    }

    #[test]
    fn test_name_required() {
        let args = Args::parse_from(["xmlmetrics"]);
        assert!(resolve_config(&args).is_err());

        let args = Args::parse_from(["xmlmetrics", "-m", "/r/@name"]);
        assert!(resolve_config(&args).is_ok());
    }
}
