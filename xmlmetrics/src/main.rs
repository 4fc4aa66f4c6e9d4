//! xmlmetrics - convert XML documents into metrics using XPath 3.1
//!
//! This is the CLI entry point: it resolves the configuration, reads the
//! input documents, converts them in parallel and prints the metrics.

mod cli;
mod config;

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, info};
use rayon::prelude::*;
use xmlmetrics_core::{format_metrics, Metric, OutputFormat, XmlParser};

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Convert all inputs; returns false when any input failed to convert
fn run(args: Args) -> Result<bool> {
    let format = OutputFormat::from_str(&args.output).map_err(|_| {
        use strum::VariantNames as _;
        anyhow!(
            "invalid format '{}'. Valid formats: {}",
            args.output,
            OutputFormat::VARIANTS.join(", ")
        )
    })?;

    let parser = XmlParser::new(config::resolve_config(&args)?);
    debug!("effective configuration: {:?}", parser.config());

    let files = expand_globs(&args.files);

    if files.is_empty() {
        if args.files.is_empty() && atty::is(atty::Stream::Stdin) {
            eprintln!("Usage: xmlmetrics <files...> [OPTIONS]");
            eprintln!("   or: cat data.xml | xmlmetrics -n <name> [OPTIONS]");
            eprintln!("\nUse --help for more information.");
            return Err(anyhow!("no input files"));
        }
        if !args.files.is_empty() {
            return Err(anyhow!("no files matched: {}", args.files.join(" ")));
        }

        let mut input = Vec::new();
        io::stdin().read_to_end(&mut input).context("Failed to read stdin")?;
        let metrics = parser.parse(&input).context("<stdin>")?;
        print_metrics(&metrics, format)?;
        return Ok(true);
    }

    // Configure thread pool
    let concurrency = args.concurrency.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .build_global()
        .ok();

    info!("converting {} file(s) with {} worker(s)", files.len(), concurrency);

    // Results keep input order
    let results: Vec<(String, Result<Vec<Metric>>)> = files
        .par_iter()
        .map(|path| (path.clone(), convert_file(&parser, Path::new(path))))
        .collect();

    let mut all_ok = true;
    let mut total = 0usize;
    let mut output: Vec<Metric> = Vec::new();

    for (path, result) in results {
        match result {
            Ok(metrics) => {
                debug!("{}: {} metric(s)", path, metrics.len());
                total += metrics.len();
                output.extend(metrics);
            }
            Err(e) => {
                eprintln!("error: {}: {:#}", path, e);
                all_ok = false;
            }
        }
    }

    info!("converted {} metric(s)", total);
    print_metrics(&output, format)?;
    Ok(all_ok)
}

fn convert_file(parser: &XmlParser, path: &Path) -> Result<Vec<Metric>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parser.parse(&bytes)?)
}

fn print_metrics(metrics: &[Metric], format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(format_metrics(metrics, format).as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Expand glob patterns to file paths
///
/// Matches of each pattern are sorted; patterns keep their command-line
/// order. Plain paths pass through unchecked so a missing file is reported
/// by the conversion.
fn expand_globs(patterns: &[String]) -> Vec<String> {
    let mut files = Vec::new();

    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(pattern.clone());
            continue;
        }

        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("invalid glob pattern '{}': {}", pattern, e);
                continue;
            }
        };

        let mut matched: Vec<String> = paths
            .flatten()
            .filter(|entry| entry.is_file())
            .filter_map(|entry| entry.to_str().map(str::to_string))
            .collect();
        matched.sort();

        if matched.is_empty() {
            log::warn!("pattern '{}' matched no files", pattern);
        }
        files.extend(matched);
    }

    files
}
