//! TempLoop CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or input
//! - 3: Transformation failure
//! - 4: Configuration error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use temploop_core::EngineError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_INPUT: u8 = 2;
    pub const TRANSFORM_FAILURE: u8 = 3;
    pub const CONFIG_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "temploop=debug"
    } else if cli.quiet {
        "temploop=error"
    } else {
        "temploop=info"
    };

    // Logs go to stderr so stdout stays a clean document
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}", default_level))),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Transform(args) => commands::transform::execute(args, cli.config.as_deref()).await,
        Commands::Expand(args) => commands::expand::execute(args, cli.config.as_deref()).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<EngineError>() {
        Some(EngineError::Config(_)) | Some(EngineError::Toml(_)) => ExitCodes::CONFIG_ERROR,
        Some(EngineError::InvalidFragment(_)) | Some(EngineError::UndefinedParameter(_)) => {
            ExitCodes::INVALID_INPUT
        }
        Some(_) => ExitCodes::TRANSFORM_FAILURE,
        None if e.is::<serde_json::Error>() || e.is::<serde_yaml::Error>() => {
            ExitCodes::INVALID_INPUT
        }
        None => ExitCodes::GENERAL_ERROR,
    }
}
