//! ampwatch - campus electricity quota watcher
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use ampwatch::cli::Cli;
use ampwatch::core::logging::{self, LogSettings};
use ampwatch::storage::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = LogSettings::resolve(cli.log_level.as_deref(), cli.json_output, cli.verbose);
    logging::init(&settings);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{}", e);
            eprintln!("Error [{}]: {}", e.error_code(), e);
            ExitCode::from(u8::from(e.exit_code()))
        }
    }
}

async fn run(cli: &Cli) -> ampwatch::Result<()> {
    let config = Config::load(&cli.config)?;

    if cli.authorize_email {
        return ampwatch::cli::authorize::execute(&config.email).await;
    }

    let report = ampwatch::cli::run::execute(&config).await?;
    tracing::debug!(
        attempts = report.attempts,
        classification = %report.message.classification,
        email = ?report.email,
        "Run complete"
    );
    Ok(())
}
