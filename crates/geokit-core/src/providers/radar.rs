//! Radar geocoding and autocomplete.
//!
//! Radar authenticates with the publishable or secret key sent verbatim in the
//! `Authorization` header.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::convert::arrays::lon_lat;
use crate::convert::{wire_enum, WireEnum};
use crate::credentials::KeyContainer;
use crate::error::{GeocodingError, ValidationError};
use crate::executor::ClientExecutor;
use crate::geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};
use crate::http_client::{HttpAuth, HttpRequest};
use crate::query::{resolve_key, CountryFilter, KeyOverride, LayerFilter, QueryString};
use crate::{Coordinate, Place, ProviderId};

pub const BASE_URL: &str = "https://api.radar.io/v1";

wire_enum! {
    pub enum Layer {
        Place = "place",
        Address = "address",
        Intersection = "intersection",
        Street = "street",
        Neighborhood = "neighborhood",
        PostalCode = "postalCode",
        Locality = "locality",
        County = "county",
        State = "state",
        Country = "country",
        Coarse = "coarse",
        Fine = "fine",
    }
}

wire_enum! {
    pub enum MatchConfidence [fallback = Unknown] {
        Exact = "exact",
        Interpolated = "interpolated",
        Fallback = "fallback",
        Unknown = "unknown",
    }
}

impl MatchConfidence {
    pub const fn score(self) -> Option<f64> {
        match self {
            Self::Exact => Some(1.0),
            Self::Interpolated => Some(0.7),
            Self::Fallback => Some(0.3),
            Self::Unknown => None,
        }
    }
}

fn require_query(query: String) -> Result<String, ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(query)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardParameters {
    pub query: String,
    pub layers: Vec<Layer>,
    pub countries: Vec<String>,
    pub api_key: Option<String>,
}

impl ForwardParameters {
    pub fn new(query: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            query: require_query(query.into())?,
            layers: Vec::new(),
            countries: Vec::new(),
            api_key: None,
        })
    }
}

impl CountryFilter for ForwardParameters {
    fn countries(&self) -> &[String] {
        &self.countries
    }
}

impl LayerFilter for ForwardParameters {
    fn layers(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.as_wire()).collect()
    }
}

impl KeyOverride for ForwardParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseParameters {
    pub coordinates: Coordinate,
    pub layers: Vec<Layer>,
    pub api_key: Option<String>,
}

impl ReverseParameters {
    pub fn new(coordinates: Coordinate) -> Self {
        Self {
            coordinates,
            layers: Vec::new(),
            api_key: None,
        }
    }
}

impl LayerFilter for ReverseParameters {
    fn layers(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.as_wire()).collect()
    }
}

impl KeyOverride for ReverseParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteParameters {
    pub query: String,
    pub near: Option<Coordinate>,
    pub layers: Vec<Layer>,
    pub countries: Vec<String>,
    pub limit: Option<usize>,
    pub api_key: Option<String>,
}

impl AutocompleteParameters {
    pub fn new(query: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            query: require_query(query.into())?,
            near: None,
            layers: Vec::new(),
            countries: Vec::new(),
            limit: None,
            api_key: None,
        })
    }
}

impl CountryFilter for AutocompleteParameters {
    fn countries(&self) -> &[String] {
        &self.countries
    }
}

impl LayerFilter for AutocompleteParameters {
    fn layers(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.as_wire()).collect()
    }
}

impl KeyOverride for AutocompleteParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressResponse {
    pub meta: Meta,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub code: u16,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_label: Option<String>,
    #[serde(default)]
    pub place_label: Option<String>,
    #[serde(default)]
    pub layer: Option<Layer>,
    #[serde(default)]
    pub confidence: Option<MatchConfidence>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_flag: Option<String>,
    /// Metres from `near`, autocomplete only.
    #[serde(default)]
    pub distance: Option<f64>,
}

impl Address {
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "lon_lat")]
    pub coordinates: Coordinate,
}

pub struct RadarService {
    executor: ClientExecutor,
    keys: Arc<KeyContainer>,
    base_url: String,
}

impl RadarService {
    pub fn new(executor: ClientExecutor, keys: Arc<KeyContainer>) -> Self {
        Self {
            executor,
            keys,
            base_url: BASE_URL.to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn forward(
        &self,
        params: &ForwardParameters,
        cancel: &CancellationToken,
    ) -> Result<AddressResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("query", &params.query)
            .layers("layers", params)
            .countries("country", params)
            .to_uri(&format!("{}/geocode/forward", self.base_url));
        self.send(uri, key, cancel).await
    }

    pub async fn reverse(
        &self,
        params: &ReverseParameters,
        cancel: &CancellationToken,
    ) -> Result<AddressResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("coordinates", params.coordinates.lat_lon())
            .layers("layers", params)
            .to_uri(&format!("{}/geocode/reverse", self.base_url));
        self.send(uri, key, cancel).await
    }

    pub async fn autocomplete(
        &self,
        params: &AutocompleteParameters,
        cancel: &CancellationToken,
    ) -> Result<AddressResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("query", &params.query)
            .push_opt("near", params.near.map(|near| near.lat_lon()))
            .layers("layers", params)
            .countries("countryCode", params)
            .push_opt("limit", params.limit)
            .to_uri(&format!("{}/search/autocomplete", self.base_url));
        self.send(uri, key, cancel).await
    }

    async fn send(
        &self,
        uri: String,
        key: String,
        cancel: &CancellationToken,
    ) -> Result<AddressResponse, GeocodingError> {
        let request = HttpRequest::get(uri).with_auth(&HttpAuth::Header {
            name: String::from("Authorization"),
            value: key,
        });
        self.executor.send(request, cancel).await
    }

    async fn geocode_places(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = ForwardParameters::new(request.query.as_str())?;
        params.countries = request.countries.clone();
        let response = self.forward(&params, cancel).await?;
        Ok(normalize(response, request.limit))
    }

    async fn reverse_places(
        &self,
        request: &ReverseRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let response = self
            .reverse(&ReverseParameters::new(request.coordinate), cancel)
            .await?;
        Ok(normalize(response, request.limit))
    }
}

fn normalize(response: AddressResponse, limit: usize) -> Vec<Place> {
    response
        .addresses
        .into_iter()
        .take(limit)
        .map(|address| {
            let coordinate = address.coordinate();
            let label = address
                .formatted_address
                .or(address.address_label)
                .or(address.place_label)
                .unwrap_or_else(|| coordinate.lat_lon());
            Place::new(ProviderId::Radar, label, coordinate)
                .with_confidence(address.confidence.and_then(MatchConfidence::score))
        })
        .collect()
}

impl Geocoder for RadarService {
    fn provider(&self) -> ProviderId {
        ProviderId::Radar
    }

    fn geocode<'a>(
        &'a self,
        request: &'a GeocodeRequest,
        cancel: &'a CancellationToken,
    ) -> GeocodeFuture<'a> {
        Box::pin(self.geocode_places(request, cancel))
    }

    fn reverse_geocode<'a>(
        &'a self,
        request: &'a ReverseRequest,
        cancel: &'a CancellationToken,
    ) -> GeocodeFuture<'a> {
        Box::pin(self.reverse_places(request, cancel))
    }
}
