use std::time::Instant;

use geokit_core::{Coordinate, ReverseRequest};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::ReverseArgs;
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::Document;
use crate::registry::Registry;

pub async fn run(
    args: &ReverseArgs,
    registry: &Registry,
    cancel: &CancellationToken,
) -> Result<Document<Value>, CliError> {
    let coordinate = Coordinate::new(args.latitude, args.longitude)?;
    let request = ReverseRequest::new(coordinate, args.limit)?;
    let geocoder = registry.geocoder(args.provider)?;

    let started = Instant::now();
    let places = geocoder.reverse_geocode(&request, cancel).await?;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(provider = %args.provider, results = places.len(), elapsed_ms, "reverse geocode finished");

    let data = serde_json::to_value(places)?;
    Ok(Document::new(Metadata::new(Some(args.provider), elapsed_ms), data))
}
