//! Google Maps Geocoding API.
//!
//! Google answers HTTP 200 for most failures and reports them through the
//! top-level `status`. The typed calls return the decoded body untouched; the
//! [`Geocoder`] impl turns non-OK statuses into provider errors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::convert::{wire_enum, WireEnum};
use crate::credentials::KeyContainer;
use crate::error::{FailureKind, GeocodingError, ProviderError, ValidationError};
use crate::executor::ClientExecutor;
use crate::geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};
use crate::query::{resolve_key, CountryFilter, KeyOverride, LayerFilter, QueryString};
use crate::{BoundingBox, Coordinate, Place, ProviderId};

pub const BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

wire_enum! {
    pub enum Status {
        Ok = "OK",
        ZeroResults = "ZERO_RESULTS",
        OverDailyLimit = "OVER_DAILY_LIMIT",
        OverQueryLimit = "OVER_QUERY_LIMIT",
        RequestDenied = "REQUEST_DENIED",
        InvalidRequest = "INVALID_REQUEST",
        UnknownError = "UNKNOWN_ERROR",
    }
}

wire_enum! {
    pub enum LocationType [fallback = Unknown] {
        Rooftop = "ROOFTOP",
        RangeInterpolated = "RANGE_INTERPOLATED",
        GeometricCenter = "GEOMETRIC_CENTER",
        Approximate = "APPROXIMATE",
        Unknown = "UNKNOWN",
    }
}

impl LocationType {
    pub const fn score(self) -> Option<f64> {
        match self {
            Self::Rooftop => Some(1.0),
            Self::RangeInterpolated => Some(0.8),
            Self::GeometricCenter => Some(0.6),
            Self::Approximate => Some(0.4),
            Self::Unknown => None,
        }
    }
}

wire_enum! {
    /// Result and address component types; also usable as `result_type` filters.
    pub enum AddressComponentType [fallback = Other] {
        StreetAddress = "street_address",
        StreetNumber = "street_number",
        Route = "route",
        Intersection = "intersection",
        Political = "political",
        Country = "country",
        AdministrativeAreaLevel1 = "administrative_area_level_1",
        AdministrativeAreaLevel2 = "administrative_area_level_2",
        Locality = "locality",
        Sublocality = "sublocality",
        Neighborhood = "neighborhood",
        Premise = "premise",
        PostalCode = "postal_code",
        PlusCode = "plus_code",
        PointOfInterest = "point_of_interest",
        Establishment = "establishment",
        Other = "other",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeParameters {
    pub address: String,
    pub countries: Vec<String>,
    pub language: Option<String>,
    pub region: Option<String>,
    pub api_key: Option<String>,
}

impl GeocodeParameters {
    pub fn new(address: impl Into<String>) -> Result<Self, ValidationError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self {
            address,
            countries: Vec::new(),
            language: None,
            region: None,
            api_key: None,
        })
    }

    /// `components=country:US|country:CA`
    fn components(&self) -> Option<String> {
        let filters = self
            .countries()
            .iter()
            .map(|country| format!("country:{country}"))
            .collect::<Vec<_>>();
        (!filters.is_empty()).then(|| filters.join("|"))
    }
}

impl CountryFilter for GeocodeParameters {
    fn countries(&self) -> &[String] {
        &self.countries
    }
}

impl KeyOverride for GeocodeParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseParameters {
    pub location: Coordinate,
    pub result_types: Vec<AddressComponentType>,
    pub language: Option<String>,
    pub api_key: Option<String>,
}

impl ReverseParameters {
    pub fn new(location: Coordinate) -> Self {
        Self {
            location,
            result_types: Vec::new(),
            language: None,
            api_key: None,
        }
    }
}

impl LayerFilter for ReverseParameters {
    fn layers(&self) -> Vec<&'static str> {
        self.result_types.iter().map(|kind| kind.as_wire()).collect()
    }
}

impl KeyOverride for ReverseParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub status: Status,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub types: Vec<AddressComponentType>,
    pub geometry: Geometry,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub partial_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(default)]
    pub location_type: Option<LocationType>,
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub bounds: Option<Viewport>,
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

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

impl From<Viewport> for BoundingBox {
    fn from(value: Viewport) -> Self {
        Self {
            south: value.southwest.lat,
            west: value.southwest.lng,
            north: value.northeast.lat,
            east: value.northeast.lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<AddressComponentType>,
}

pub struct GoogleService {
    executor: ClientExecutor,
    keys: Arc<KeyContainer>,
    base_url: String,
}

impl GoogleService {
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
    ) -> Result<GeocodeResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("address", &params.address)
            .push_opt("components", params.components())
            .push_opt("language", params.language.as_deref())
            .push_opt("region", params.region.as_deref())
            .push("key", key)
            .to_uri(&self.base_url);
        self.executor.call(&uri, cancel).await
    }

    pub async fn reverse_geocode(
        &self,
        params: &ReverseParameters,
        cancel: &CancellationToken,
    ) -> Result<GeocodeResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("latlng", params.location.lat_lon())
            .push_joined("result_type", &params.layers(), "|")
            .push_opt("language", params.language.as_deref())
            .push("key", key)
            .to_uri(&self.base_url);
        self.executor.call(&uri, cancel).await
    }

    async fn geocode_places(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = GeocodeParameters::new(request.query.as_str())?;
        params.countries = request.countries.clone();
        let response = self.geocode(&params, cancel).await?;
        normalize(response, request.limit)
    }

    async fn reverse_places(
        &self,
        request: &ReverseRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let response = self
            .reverse_geocode(&ReverseParameters::new(request.coordinate), cancel)
            .await?;
        normalize(response, request.limit)
    }
}

fn normalize(response: GeocodeResponse, limit: usize) -> Result<Vec<Place>, GeocodingError> {
    let kind = match response.status {
        Status::Ok | Status::ZeroResults => None,
        Status::RequestDenied => Some(FailureKind::Credential),
        _ => Some(FailureKind::Status),
    };
    if let Some(kind) = kind {
        let message = response
            .error_message
            .unwrap_or_else(|| format!("google returned status {}", response.status));
        return Err(ProviderError::new(ProviderId::Google, kind, message).into());
    }

    Ok(response
        .results
        .into_iter()
        .take(limit)
        .map(|result| {
            let geometry = result.geometry;
            Place::new(
                ProviderId::Google,
                result.formatted_address,
                geometry.location.into(),
            )
            .with_bounds(geometry.bounds.or(geometry.viewport).map(BoundingBox::from))
            .with_confidence(geometry.location_type.and_then(LocationType::score))
        })
        .collect())
}

impl Geocoder for GoogleService {
    fn provider(&self) -> ProviderId {
        ProviderId::Google
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::ScriptedHttpClient;

    const RESULTS: &str = r#"{
        "results": [{
            "address_components": [
                {"long_name": "1600", "short_name": "1600", "types": ["street_number"]},
                {"long_name": "Mountain View", "short_name": "Mountain View", "types": ["locality", "political"]},
                {"long_name": "Santa Clara County", "short_name": "Santa Clara County", "types": ["administrative_area_level_2", "political"]},
                {"long_name": "Earth", "short_name": "Earth", "types": ["colloquial_area"]}
            ],
            "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
            "geometry": {
                "location": {"lat": 37.4224764, "lng": -122.0842499},
                "location_type": "ROOFTOP",
                "viewport": {
                    "northeast": {"lat": 37.4238253802915, "lng": -122.0829009197085},
                    "southwest": {"lat": 37.4211274197085, "lng": -122.0855988802915}
                }
            },
            "place_id": "ChIJ2eUgeAK6j4ARbn5u_wAGqWA",
            "types": ["street_address"]
        }],
        "status": "OK"
    }"#;

    fn service(client: Arc<ScriptedHttpClient>) -> GoogleService {
        GoogleService::new(
            ClientExecutor::new(ProviderId::Google, client),
            Arc::new(KeyContainer::with_key(ProviderId::Google, "google-key")),
        )
    }

    #[tokio::test]
    async fn geocode_decodes_enums_and_builds_components_filter() {
        let client = Arc::new(ScriptedHttpClient::replying(RESULTS));
        let mut params = GeocodeParameters::new("1600 Amphitheatre").expect("valid");
        params.countries = vec![String::from("US"), String::from("CA")];

        let response = service(client.clone())
            .geocode(&params, &CancellationToken::new())
            .await
            .expect("response");

        assert_eq!(response.status, Status::Ok);
        let result = &response.results[0];
        assert_eq!(result.geometry.location_type, Some(LocationType::Rooftop));
        assert_eq!(
            result.address_components[1].types,
            vec![AddressComponentType::Locality, AddressComponentType::Political]
        );
        assert_eq!(
            result.address_components[3].types,
            vec![AddressComponentType::Other]
        );
        assert_eq!(
            client.requests()[0].url,
            format!(
                "{BASE_URL}?address=1600%20Amphitheatre&components=country%3AUS%7Ccountry%3ACA&key=google-key"
            )
        );
    }

    #[tokio::test]
    async fn request_key_overrides_configured_key() {
        let client = Arc::new(ScriptedHttpClient::replying(RESULTS));
        let mut params = ReverseParameters::new(Coordinate::new(37.42, -122.08).expect("valid"));
        params.api_key = Some(String::from("per-request"));
        params.result_types = vec![AddressComponentType::StreetAddress, AddressComponentType::Route];

        service(client.clone())
            .reverse_geocode(&params, &CancellationToken::new())
            .await
            .expect("response");

        assert_eq!(
            client.requests()[0].url,
            format!("{BASE_URL}?latlng=37.42%2C-122.08&result_type=street_address%7Croute&key=per-request")
        );
    }

    #[tokio::test]
    async fn unknown_status_is_a_parse_failure() {
        let client = Arc::new(ScriptedHttpClient::replying(
            r#"{"results":[],"status":"SOMETHING_NEW"}"#,
        ));
        let params = GeocodeParameters::new("x").expect("valid");

        let error = service(client)
            .geocode(&params, &CancellationToken::new())
            .await
            .expect_err("must fail");

        assert_eq!(error.failure_kind(), Some(FailureKind::Parse));
    }

    #[tokio::test]
    async fn request_denied_maps_to_credential_failure() {
        let client = Arc::new(ScriptedHttpClient::replying(
            r#"{"results":[],"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#,
        ));
        let request = GeocodeRequest::new("x", 1).expect("valid");

        let error = Geocoder::geocode(&service(client), &request, &CancellationToken::new())
            .await
            .expect_err("must fail");

        let provider_error = error.as_provider_error().expect("provider error");
        assert_eq!(provider_error.kind(), FailureKind::Credential);
        assert_eq!(provider_error.message(), "The provided API key is invalid.");
    }

    #[tokio::test]
    async fn zero_results_is_an_empty_list() {
        let client = Arc::new(ScriptedHttpClient::replying(
            r#"{"results":[],"status":"ZERO_RESULTS"}"#,
        ));
        let request = GeocodeRequest::new("nowhere", 1).expect("valid");

        let places = Geocoder::geocode(&service(client), &request, &CancellationToken::new())
            .await
            .expect("places");

        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn geocoder_uses_viewport_and_location_type() {
        let client = Arc::new(ScriptedHttpClient::replying(RESULTS));
        let request = GeocodeRequest::new("1600 Amphitheatre", 1).expect("valid");

        let places = Geocoder::geocode(&service(client), &request, &CancellationToken::new())
            .await
            .expect("places");

        assert_eq!(places[0].confidence, Some(1.0));
        let bounds = places[0].bounds.expect("viewport");
        assert!(bounds.contains(places[0].coordinate));
    }
}
