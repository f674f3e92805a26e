//! `envelope`: command-line entry point.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the subcommand against stdin/stdout.
//!
//! Command failures are written to stderr as a JSON [`ErrorResponse`] and the
//! process exits with [`ServiceError::exit_code`].

mod commands;
mod config;
mod telemetry;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use common::protocol::ErrorResponse;
use common::ServiceError;
use tracing::warn;

use crate::commands::Cli;
use crate::config::Config;

fn main() -> Result<ExitCode> {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    let stdin = io::stdin();
    let stdout = io::stdout();
    match commands::run(&cli.command, &cfg, &mut stdin.lock(), &mut stdout.lock()) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => Ok(report(&err)),
    }
}

fn report(err: &ServiceError) -> ExitCode {
    warn!(code = err.code(), "command failed");
    let doc = ErrorResponse::from(err);
    match serde_json::to_string(&doc) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{err}"),
    }
    // Exit codes are all below 256.
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}
