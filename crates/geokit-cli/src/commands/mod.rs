mod geocode;
mod providers;
mod reverse;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Document;
use crate::registry::Registry;

pub async fn run(
    cli: &Cli,
    registry: &Registry,
    cancel: &CancellationToken,
) -> Result<Document<Value>, CliError> {
    match &cli.command {
        Command::Geocode(args) => geocode::run(args, registry, cancel).await,
        Command::Reverse(args) => reverse::run(args, registry, cancel).await,
        Command::Providers => providers::run(registry),
    }
}
