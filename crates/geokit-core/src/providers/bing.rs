//! Bing Maps Locations API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::convert::arrays::{lat_lon, south_west_north_east};
use crate::convert::{wire_enum, WireEnum};
use crate::credentials::KeyContainer;
use crate::error::{GeocodingError, ProviderError, ValidationError};
use crate::executor::ClientExecutor;
use crate::geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};
use crate::query::{resolve_key, KeyOverride, LayerFilter, QueryString};
use crate::{BoundingBox, Coordinate, Place, ProviderId};

pub const BASE_URL: &str = "https://dev.virtualearth.net/REST/v1/Locations";

wire_enum! {
    pub enum Confidence [fallback = Unknown] {
        High,
        Medium,
        Low,
        Unknown,
    }
}

impl Confidence {
    pub const fn score(self) -> Option<f64> {
        match self {
            Self::High => Some(1.0),
            Self::Medium => Some(0.6),
            Self::Low => Some(0.3),
            Self::Unknown => None,
        }
    }
}

wire_enum! {
    pub enum MatchCode {
        Good,
        Ambiguous,
        UpHierarchy,
    }
}

wire_enum! {
    /// Entity types; also the values accepted by `includeEntityTypes`.
    pub enum EntityType [fallback = Other] {
        Address,
        Neighborhood,
        PopulatedPlace,
        Postcode1,
        AdminDivision1,
        AdminDivision2,
        CountryRegion,
        RoadBlock,
        RoadIntersection,
        Other,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeParameters {
    pub query: String,
    pub max_results: Option<usize>,
    /// ISO 3166 alpha-2 region used to bias results.
    pub user_region: Option<String>,
    pub culture: Option<String>,
    pub api_key: Option<String>,
}

impl GeocodeParameters {
    pub fn new(query: impl Into<String>) -> Result<Self, ValidationError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self {
            query,
            max_results: None,
            user_region: None,
            culture: None,
            api_key: None,
        })
    }
}

impl KeyOverride for GeocodeParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseParameters {
    pub point: Coordinate,
    pub include_entity_types: Vec<EntityType>,
    pub culture: Option<String>,
    pub api_key: Option<String>,
}

impl ReverseParameters {
    pub fn new(point: Coordinate) -> Self {
        Self {
            point,
            include_entity_types: Vec::new(),
            culture: None,
            api_key: None,
        }
    }
}

impl KeyOverride for ReverseParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

impl LayerFilter for ReverseParameters {
    fn layers(&self) -> Vec<&'static str> {
        self.include_entity_types
            .iter()
            .map(|kind| kind.as_wire())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub status_code: u16,
    #[serde(default)]
    pub status_description: Option<String>,
    #[serde(default)]
    pub authentication_result_code: Option<String>,
    #[serde(default)]
    pub error_details: Vec<String>,
    #[serde(default)]
    pub resource_sets: Vec<ResourceSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSet {
    #[serde(default)]
    pub estimated_total: u32,
    #[serde(default)]
    pub resources: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub point: GeoPoint,
    #[serde(default, with = "south_west_north_east::option")]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub match_codes: Vec<MatchCode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(with = "lat_lon")]
    pub coordinates: Coordinate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub address_line: Option<String>,
    #[serde(default)]
    pub admin_district: Option<String>,
    #[serde(default)]
    pub admin_district2: Option<String>,
    #[serde(default)]
    pub country_region: Option<String>,
    #[serde(default)]
    pub country_region_iso2: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl LocationResponse {
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.resource_sets.iter().flat_map(|set| set.resources.iter())
    }
}

pub struct BingService {
    executor: ClientExecutor,
    keys: Arc<KeyContainer>,
    base_url: String,
}

impl BingService {
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

    pub async fn geocode(
        &self,
        params: &GeocodeParameters,
        cancel: &CancellationToken,
    ) -> Result<LocationResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("query", &params.query)
            .push_opt("maxResults", params.max_results)
            .push_opt("userRegion", params.user_region.as_deref())
            .push_opt("culture", params.culture.as_deref())
            .push("key", key)
            .to_uri(&self.base_url);
        self.executor.call(&uri, cancel).await
    }

    pub async fn reverse_geocode(
        &self,
        params: &ReverseParameters,
        cancel: &CancellationToken,
    ) -> Result<LocationResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .layers("includeEntityTypes", params)
            .push_opt("culture", params.culture.as_deref())
            .push("key", key)
            .to_uri(&format!("{}/{}", self.base_url, params.point.lat_lon()));
        self.executor.call(&uri, cancel).await
    }

    async fn geocode_places(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = GeocodeParameters::new(request.query.as_str())?;
        params.max_results = Some(request.limit);
        params.user_region = request.countries.first().cloned();
        let response = self.geocode(&params, cancel).await?;
        normalize(&response, request.limit)
    }

    async fn reverse_places(
        &self,
        request: &ReverseRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let response = self
            .reverse_geocode(&ReverseParameters::new(request.coordinate), cancel)
            .await?;
        normalize(&response, request.limit)
    }
}

fn normalize(response: &LocationResponse, limit: usize) -> Result<Vec<Place>, GeocodingError> {
    if response.status_code != 200 {
        let detail = response
            .error_details
            .first()
            .or(response.status_description.as_ref())
            .cloned()
            .unwrap_or_else(|| String::from("bing request failed"));
        return Err(ProviderError::status(ProviderId::Bing, response.status_code, detail).into());
    }

    Ok(response
        .locations()
        .take(limit)
        .map(|location| {
            let label = location
                .address
                .formatted_address
                .clone()
                .unwrap_or_else(|| location.name.clone());
            Place::new(ProviderId::Bing, label, location.point.coordinates)
                .with_bounds(location.bbox)
                .with_confidence(location.confidence.and_then(Confidence::score))
        })
        .collect())
}

impl Geocoder for BingService {
    fn provider(&self) -> ProviderId {
        ProviderId::Bing
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
