//! Expand command - Expand a bare template fragment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use tracing::info;

use temploop_core::Processor;

use super::{load_config, read_document, write_document, Format};
use crate::ExitCodes;

#[derive(Args)]
pub struct ExpandArgs {
    /// Template fragment to expand (JSON or YAML), `-` for stdin
    #[arg(short, long, default_value = "-")]
    template: String,

    /// Parameter override as NAME=VALUE; VALUE is parsed as JSON when possible
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// Write the expanded fragment here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

pub async fn execute(args: ExpandArgs, config: Option<&Path>) -> Result<u8> {
    let config = load_config(config)?;
    let fragment = read_document(&args.template).await?;
    let overrides: Map<String, Value> = args.params.into_iter().collect();

    let processor = Processor::new(&fragment, &overrides, config)?;
    let expanded = processor.process()?;

    let count = expanded
        .get("Resources")
        .and_then(Value::as_object)
        .map_or(0, Map::len);
    info!("Expanded fragment has {} resources", count);

    write_document(expanded, args.output.as_deref(), args.format)
        .await
        .context("Failed to write expanded fragment")?;
    Ok(ExitCodes::SUCCESS)
}

/// Parse `NAME=VALUE`.
fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
