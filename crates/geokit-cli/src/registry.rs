//! Composition root: one credential holder and one service per configured provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use geokit_core::providers::arcgis::ArcGisTokenRetrieval;
use geokit_core::providers::{
    ArcGisService, BingService, GoogleService, HereService, MapQuestService, MapboxService,
    PositionstackService, RadarService,
};
use geokit_core::{
    ClientExecutor, Geocoder, HttpClient, KeyContainer, ProviderId, TokenContainer,
};
use tracing::debug;

use crate::config::CredentialArgs;
use crate::error::CliError;

pub struct Registry {
    geocoders: BTreeMap<ProviderId, Arc<dyn Geocoder>>,
}

impl Registry {
    /// Wires every provider whose credentials are present onto `http_client`.
    pub fn build(
        credentials: &CredentialArgs,
        http_client: Arc<dyn HttpClient>,
        timeout_ms: u64,
    ) -> Self {
        let executor = |provider: ProviderId| {
            ClientExecutor::new(provider, Arc::clone(&http_client)).with_timeout_ms(timeout_ms)
        };
        let keys = |provider: ProviderId, key: &str| Arc::new(KeyContainer::with_key(provider, key));

        let mut geocoders: BTreeMap<ProviderId, Arc<dyn Geocoder>> = BTreeMap::new();

        if let Some(oauth) = credentials.arcgis_credentials() {
            let retrieval = ArcGisTokenRetrieval::new(executor(ProviderId::Arcgis));
            let tokens = Arc::new(TokenContainer::new(
                ProviderId::Arcgis,
                oauth,
                Arc::new(retrieval),
            ));
            geocoders.insert(
                ProviderId::Arcgis,
                Arc::new(ArcGisService::new(executor(ProviderId::Arcgis), tokens)),
            );
        }

        for provider in ProviderId::ALL {
            let Some(key) = credentials.api_key(provider) else {
                continue;
            };
            let service: Arc<dyn Geocoder> = match provider {
                ProviderId::Arcgis => continue,
                ProviderId::Bing => Arc::new(BingService::new(executor(provider), keys(provider, key))),
                ProviderId::Google => {
                    Arc::new(GoogleService::new(executor(provider), keys(provider, key)))
                }
                ProviderId::Here => Arc::new(HereService::new(executor(provider), keys(provider, key))),
                ProviderId::Mapbox => {
                    Arc::new(MapboxService::new(executor(provider), keys(provider, key)))
                }
                ProviderId::Mapquest => {
                    Arc::new(MapQuestService::new(executor(provider), keys(provider, key)))
                }
                ProviderId::Positionstack => Arc::new(PositionstackService::new(
                    executor(provider),
                    keys(provider, key),
                )),
                ProviderId::Radar => {
                    Arc::new(RadarService::new(executor(provider), keys(provider, key)))
                }
            };
            geocoders.insert(provider, service);
        }

        let missing = ProviderId::ALL
            .into_iter()
            .filter(|provider| !credentials.is_configured(*provider))
            .collect::<Vec<_>>();
        debug!(
            configured = ?geocoders.keys().collect::<Vec<_>>(),
            ?missing,
            "providers wired"
        );
        Self { geocoders }
    }

    pub fn geocoder(&self, provider: ProviderId) -> Result<Arc<dyn Geocoder>, CliError> {
        self.geocoders
            .get(&provider)
            .cloned()
            .ok_or(CliError::NotConfigured { provider })
    }

    pub fn is_configured(&self, provider: ProviderId) -> bool {
        self.geocoders.contains_key(&provider)
    }
}
