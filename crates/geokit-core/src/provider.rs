use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical identifiers for the wrapped geocoding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Arcgis,
    Bing,
    Google,
    Here,
    Mapbox,
    Mapquest,
    Positionstack,
    Radar,
}

impl ProviderId {
    pub const ALL: [Self; 8] = [
        Self::Arcgis,
        Self::Bing,
        Self::Google,
        Self::Here,
        Self::Mapbox,
        Self::Mapquest,
        Self::Positionstack,
        Self::Radar,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arcgis => "arcgis",
            Self::Bing => "bing",
            Self::Google => "google",
            Self::Here => "here",
            Self::Mapbox => "mapbox",
            Self::Mapquest => "mapquest",
            Self::Positionstack => "positionstack",
            Self::Radar => "radar",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == normalized)
            .ok_or(ValidationError::UnknownProvider { value: normalized })
    }
}
