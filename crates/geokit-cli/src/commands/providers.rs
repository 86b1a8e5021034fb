use geokit_core::ProviderId;
use serde::Serialize;
use serde_json::Value;

use crate::config::auth_scheme;
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::Document;
use crate::registry::Registry;

#[derive(Debug, Serialize)]
struct ProviderEntry {
    provider: ProviderId,
    auth: &'static str,
    configured: bool,
}

pub fn run(registry: &Registry) -> Result<Document<Value>, CliError> {
    let entries = ProviderId::ALL
        .into_iter()
        .map(|provider| ProviderEntry {
            provider,
            auth: auth_scheme(provider),
            configured: registry.is_configured(provider),
        })
        .collect::<Vec<_>>();

    let data = serde_json::to_value(entries)?;
    Ok(Document::new(Metadata::new(None, 0), data))
}
