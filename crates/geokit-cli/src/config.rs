//! Provider credentials read from flags or `GEOKIT_*` environment variables.

use clap::Args;
use geokit_core::{Credentials, ProviderId};

/// Credentials for every provider; unset providers are simply unavailable.
#[derive(Debug, Clone, Default, Args)]
pub struct CredentialArgs {
    /// ArcGIS OAuth client id.
    #[arg(long, global = true, env = "GEOKIT_ARCGIS_CLIENT_ID", hide_env_values = true)]
    pub arcgis_client_id: Option<String>,

    /// ArcGIS OAuth client secret.
    #[arg(long, global = true, env = "GEOKIT_ARCGIS_CLIENT_SECRET", hide_env_values = true)]
    pub arcgis_client_secret: Option<String>,

    #[arg(long, global = true, env = "GEOKIT_BING_KEY", hide_env_values = true)]
    pub bing_key: Option<String>,

    #[arg(long, global = true, env = "GEOKIT_GOOGLE_KEY", hide_env_values = true)]
    pub google_key: Option<String>,

    #[arg(long, global = true, env = "GEOKIT_HERE_KEY", hide_env_values = true)]
    pub here_key: Option<String>,

    /// MapBox access token.
    #[arg(long, global = true, env = "GEOKIT_MAPBOX_TOKEN", hide_env_values = true)]
    pub mapbox_token: Option<String>,

    #[arg(long, global = true, env = "GEOKIT_MAPQUEST_KEY", hide_env_values = true)]
    pub mapquest_key: Option<String>,

    #[arg(long, global = true, env = "GEOKIT_POSITIONSTACK_KEY", hide_env_values = true)]
    pub positionstack_key: Option<String>,

    #[arg(long, global = true, env = "GEOKIT_RADAR_KEY", hide_env_values = true)]
    pub radar_key: Option<String>,
}

impl CredentialArgs {
    /// API key for a key-authenticated provider; `None` for ArcGIS or when unset.
    pub fn api_key(&self, provider: ProviderId) -> Option<&str> {
        let key = match provider {
            ProviderId::Arcgis => None,
            ProviderId::Bing => self.bing_key.as_deref(),
            ProviderId::Google => self.google_key.as_deref(),
            ProviderId::Here => self.here_key.as_deref(),
            ProviderId::Mapbox => self.mapbox_token.as_deref(),
            ProviderId::Mapquest => self.mapquest_key.as_deref(),
            ProviderId::Positionstack => self.positionstack_key.as_deref(),
            ProviderId::Radar => self.radar_key.as_deref(),
        };
        key.filter(|key| !key.trim().is_empty())
    }

    /// ArcGIS client id and secret, when both are set.
    pub fn arcgis_credentials(&self) -> Option<Credentials> {
        let id = self.arcgis_client_id.as_deref()?.trim();
        let secret = self.arcgis_client_secret.as_deref()?.trim();
        (!id.is_empty() && !secret.is_empty()).then(|| Credentials::new(id, secret))
    }

    pub fn is_configured(&self, provider: ProviderId) -> bool {
        match provider {
            ProviderId::Arcgis => self.arcgis_credentials().is_some(),
            other => self.api_key(other).is_some(),
        }
    }
}

/// How a provider authenticates, for `geokit providers`.
pub const fn auth_scheme(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Arcgis => "oauth client credentials",
        ProviderId::Radar => "authorization header",
        _ => "query api key",
    }
}
