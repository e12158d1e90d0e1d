//! Transform command - Process a macro request envelope.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use temploop_core::{handle_value, TransformStatus};

use super::{load_config, read_document, write_document, Format};
use crate::ExitCodes;

#[derive(Args)]
pub struct TransformArgs {
    /// Request envelope to process (JSON or YAML), `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Write the response here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn execute(args: TransformArgs, config: Option<&std::path::Path>) -> Result<u8> {
    let config = load_config(config)?;
    let request = read_document(&args.input).await?;

    let response = handle_value(&request, &config);
    info!(
        "Request {} finished with status {:?}",
        response.request_id, response.status
    );

    write_document(
        &serde_json::to_value(&response)?,
        args.output.as_deref(),
        Format::Json,
    )
    .await?;

    Ok(match response.status {
        TransformStatus::Success => ExitCodes::SUCCESS,
        TransformStatus::Fail => ExitCodes::TRANSFORM_FAILURE,
    })
}
