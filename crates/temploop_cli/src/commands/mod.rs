//! CLI command definitions.
//!
//! Each subcommand drives the expansion engine over a document read from a
//! file or stdin.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::debug;

use temploop_core::ExpansionConfig;

pub mod expand;
pub mod transform;

/// TempLoop - expand List<...> resources in template fragments
#[derive(Parser)]
#[command(name = "temploop")]
#[command(version, about = "TempLoop - expand List<...> resources in template fragments")]
#[command(long_about = r#"
TempLoop expands a resource declared as `List<ElementType>` into one concrete
resource per element of its `TempLoop::Iteration` metadata, then rewrites
references to the list resource into lists of references.

COMMANDS:
  transform  → Process a macro request envelope, print the response
  expand     → Expand a bare template fragment

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or input
  3 - Transformation failure
  4 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Expansion config file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "TEMPLOOP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a transform request envelope
    Transform(transform::TransformArgs),

    /// Expand a bare template fragment
    Expand(expand::ExpandArgs),
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

/// Load the expansion config, falling back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<ExpansionConfig> {
    match path {
        Some(path) => Ok(ExpansionConfig::from_file(path)?),
        None => Ok(ExpansionConfig::default()),
    }
}

/// Read a JSON or YAML document from a path, or stdin for `-`.
pub async fn read_document(source: &str) -> Result<Value> {
    let content = if source == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read stdin")?;
        buffer
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read {}", source))?
    };

    parse_document(&content)
}

/// Parse JSON, falling back to YAML.
pub fn parse_document(content: &str) -> Result<Value> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            debug!("Input is not JSON ({}), trying YAML", json_err);
            Ok(serde_yaml::from_str(content)?)
        }
    }
}

/// Render a document in the requested format.
pub fn render_document(value: &Value, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Write a document to a file, or stdout when no path is given.
pub async fn write_document(value: &Value, output: Option<&Path>, format: Format) -> Result<()> {
    let rendered = render_document(value, format)?;
    match output {
        Some(path) => tokio::fs::write(path, rendered)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }
    Ok(())
}
