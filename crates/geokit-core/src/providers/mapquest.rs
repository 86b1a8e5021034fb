//! MapQuest Geocoding API v1.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::convert::wire_enum;
use crate::credentials::KeyContainer;
use crate::error::{FailureKind, GeocodingError, ProviderError, ValidationError};
use crate::executor::ClientExecutor;
use crate::geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};
use crate::query::{resolve_key, KeyOverride, QueryString};
use crate::{Coordinate, Place, ProviderId};

pub const BASE_URL: &str = "https://www.mapquestapi.com/geocoding/v1";

wire_enum! {
    pub enum GeocodeQuality [fallback = Unknown] {
        Point = "POINT",
        Address = "ADDRESS",
        Intersection = "INTERSECTION",
        Street = "STREET",
        Neighborhood = "NEIGHBORHOOD",
        City = "CITY",
        County = "COUNTY",
        State = "STATE",
        Country = "COUNTRY",
        Zip = "ZIP",
        ZipExtended = "ZIP_EXTENDED",
        Unknown = "UNKNOWN",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressParameters {
    pub location: String,
    pub max_results: Option<usize>,
    pub api_key: Option<String>,
}

impl AddressParameters {
    pub fn new(location: impl Into<String>) -> Result<Self, ValidationError> {
        let location = location.into();
        if location.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self {
            location,
            max_results: None,
            api_key: None,
        })
    }
}

impl KeyOverride for AddressParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseParameters {
    pub location: Coordinate,
    pub api_key: Option<String>,
}

impl ReverseParameters {
    pub fn new(location: Coordinate) -> Self {
        Self {
            location,
            api_key: None,
        }
    }
}

impl KeyOverride for ReverseParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub info: Info,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub statuscode: i32,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    #[serde(default)]
    pub provided_location: Option<ProvidedLocation>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidedLocation {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub lat_lng: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinate {
    fn from(value: LatLng) -> Self {
        Self {
            latitude: value.lat,
            longitude: value.lng,
        }
    }
}

/// `adminArea1` is the country, `adminArea3` the state, `adminArea4` the
/// county, `adminArea5` the city and `adminArea6` the neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub admin_area6: Option<String>,
    #[serde(default)]
    pub admin_area5: Option<String>,
    #[serde(default)]
    pub admin_area4: Option<String>,
    #[serde(default)]
    pub admin_area3: Option<String>,
    #[serde(default)]
    pub admin_area1: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub geocode_quality: GeocodeQuality,
    #[serde(default)]
    pub geocode_quality_code: Option<String>,
    pub lat_lng: LatLng,
    #[serde(default)]
    pub display_lat_lng: Option<LatLng>,
    #[serde(default)]
    pub side_of_street: Option<String>,
}

impl Location {
    /// Comma-joined non-empty address parts, most specific first.
    pub fn label(&self) -> String {
        [
            &self.street,
            &self.admin_area6,
            &self.admin_area5,
            &self.admin_area3,
            &self.postal_code,
            &self.admin_area1,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

pub struct MapQuestService {
    executor: ClientExecutor,
    keys: Arc<KeyContainer>,
    base_url: String,
}

impl MapQuestService {
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

    pub async fn address(
        &self,
        params: &AddressParameters,
        cancel: &CancellationToken,
    ) -> Result<GeocodeResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("key", key)
            .push("location", &params.location)
            .push_opt("maxResults", params.max_results)
            .push("thumbMaps", false)
            .to_uri(&format!("{}/address", self.base_url));
        self.executor.call(&uri, cancel).await
    }

    pub async fn reverse(
        &self,
        params: &ReverseParameters,
        cancel: &CancellationToken,
    ) -> Result<GeocodeResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("key", key)
            .push("location", params.location.lat_lon())
            .push("thumbMaps", false)
            .to_uri(&format!("{}/reverse", self.base_url));
        self.executor.call(&uri, cancel).await
    }

    async fn geocode_places(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = AddressParameters::new(request.query.as_str())?;
        params.max_results = Some(request.limit);
        let response = self.address(&params, cancel).await?;
        normalize(response, request.limit)
    }

    async fn reverse_places(
        &self,
        request: &ReverseRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let response = self
            .reverse(&ReverseParameters::new(request.coordinate), cancel)
            .await?;
        normalize(response, request.limit)
    }
}

fn normalize(response: GeocodeResponse, limit: usize) -> Result<Vec<Place>, GeocodingError> {
    let status = response.info.statuscode;
    if status != 0 {
        let kind = if status == 403 {
            FailureKind::Credential
        } else {
            FailureKind::Status
        };
        let message = response
            .info
            .messages
            .first()
            .cloned()
            .unwrap_or_else(|| format!("mapquest returned status code {status}"));
        let mut error = ProviderError::new(ProviderId::Mapquest, kind, message);
        if let Ok(code) = u16::try_from(status) {
            error = error.with_status(code);
        }
        return Err(error.into());
    }

    Ok(response
        .results
        .into_iter()
        .flat_map(|result| result.locations)
        .take(limit)
        .map(|location| Place::new(ProviderId::Mapquest, location.label(), location.lat_lng.into()))
        .collect())
}

impl Geocoder for MapQuestService {
    fn provider(&self) -> ProviderId {
        ProviderId::Mapquest
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
