use std::fmt::{Debug, Formatter};
use std::sync::OnceLock;

use crate::error::{GeocodingError, ProviderError};
use crate::ProviderId;

/// Write-once holder of one provider's static API key.
///
/// The composition root owns one container per provider and hands it to the
/// provider service as an `Arc<KeyContainer>`.
pub struct KeyContainer {
    provider: ProviderId,
    key: OnceLock<String>,
}

impl KeyContainer {
    pub const fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            key: OnceLock::new(),
        }
    }

    /// Creates a container that already holds `key`.
    pub fn with_key(provider: ProviderId, key: impl Into<String>) -> Self {
        let container = Self::new(provider);
        let _ = container.key.set(key.into());
        container
    }

    /// Stores the key. Fails with a credential error if a key is already set;
    /// the stored key is left untouched in that case.
    pub fn set_key(&self, key: impl Into<String>) -> Result<(), GeocodingError> {
        self.key.set(key.into()).map_err(|_| {
            ProviderError::credential(
                self.provider,
                format!("{} api key has already been set", self.provider),
            )
            .into()
        })
    }

    /// Returns the stored key, or `""` if none was ever set.
    pub fn key(&self) -> &str {
        self.key.get().map_or("", String::as_str)
    }

    pub fn is_set(&self) -> bool {
        self.key.get().is_some()
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }
}

impl Debug for KeyContainer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyContainer")
            .field("provider", &self.provider)
            .field("is_set", &self.is_set())
            .finish()
    }
}
