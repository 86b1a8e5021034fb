//! Query-string assembly and the optional capabilities parameter types mix in.

use crate::credentials::KeyContainer;
use crate::error::{GeocodingError, ProviderError};

/// Parameters that can restrict results to a set of countries.
pub trait CountryFilter {
    /// ISO 3166 country codes, in the form the provider expects.
    fn countries(&self) -> &[String];
}

/// Parameters that can restrict results to provider-specific layers or types.
pub trait LayerFilter {
    fn layers(&self) -> Vec<&'static str>;
}

/// Parameters that may carry their own API key.
pub trait KeyOverride {
    fn api_key(&self) -> Option<&str> {
        None
    }
}

/// Picks the per-request key if present, else the container's key.
///
/// # Errors
///
/// Returns a credential failure when neither source has a key, before any
/// request is built.
pub fn resolve_key<P: KeyOverride + ?Sized>(
    params: &P,
    keys: &KeyContainer,
) -> Result<String, GeocodingError> {
    let key = params
        .api_key()
        .filter(|key| !key.trim().is_empty())
        .unwrap_or_else(|| keys.key());
    if key.trim().is_empty() {
        return Err(ProviderError::credential(
            keys.provider(),
            format!("no {} api key configured", keys.provider()),
        )
        .into());
    }
    Ok(key.to_owned())
}

/// Ordered, percent-encoded query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, name: &str, value: impl ToString) -> Self {
        self.pairs.push((name.to_owned(), value.to_string()));
        self
    }

    pub fn push_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(name, value),
            None => self,
        }
    }

    /// Adds `name=a<sep>b<sep>c`, skipped when `values` is empty.
    pub fn push_joined<V: AsRef<str>>(self, name: &str, values: &[V], separator: &str) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(separator);
        self.push(name, joined)
    }

    pub fn countries<P: CountryFilter + ?Sized>(self, name: &str, params: &P) -> Self {
        self.push_joined(name, params.countries(), ",")
    }

    pub fn layers<P: LayerFilter + ?Sized>(self, name: &str, params: &P) -> Self {
        self.push_joined(name, &params.layers(), ",")
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `base?query`, or just `base` when there are no parameters.
    pub fn to_uri(&self, base: &str) -> String {
        if self.is_empty() {
            base.to_owned()
        } else {
            format!("{base}?{}", self.encode())
        }
    }
}
