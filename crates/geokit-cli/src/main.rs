mod cli;
mod commands;
mod config;
mod error;
mod metadata;
mod output;
mod registry;

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use geokit_core::ReqwestHttpClient;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;
use crate::registry::Registry;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling in-flight calls");
            on_interrupt.cancel();
        }
    });

    let registry = Registry::build(
        &cli.credentials,
        Arc::new(ReqwestHttpClient::new()),
        cli.timeout_ms,
    );

    let document = commands::run(&cli, &registry, &cancel).await?;
    debug!(request_id = %document.meta.request_id, "rendering output");
    output::render(&document, cli.pretty)?;

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("geokit_core=debug,geokit=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
