//! Positionstack forward and reverse geocoding.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::credentials::KeyContainer;
use crate::error::{GeocodingError, ValidationError};
use crate::executor::ClientExecutor;
use crate::geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};
use crate::query::{resolve_key, CountryFilter, KeyOverride, QueryString};
use crate::{Coordinate, Place, ProviderId};

pub const BASE_URL: &str = "http://api.positionstack.com/v1";

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardParameters {
    pub query: String,
    pub limit: Option<usize>,
    pub countries: Vec<String>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub access_key: Option<String>,
}

impl ForwardParameters {
    pub fn new(query: impl Into<String>) -> Result<Self, ValidationError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self {
            query,
            limit: None,
            countries: Vec::new(),
            region: None,
            language: None,
            access_key: None,
        })
    }
}

impl CountryFilter for ForwardParameters {
    fn countries(&self) -> &[String] {
        &self.countries
    }
}

impl KeyOverride for ForwardParameters {
    fn api_key(&self) -> Option<&str> {
        self.access_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseParameters {
    pub point: Coordinate,
    pub limit: Option<usize>,
    pub language: Option<String>,
    pub access_key: Option<String>,
}

impl ReverseParameters {
    pub fn new(point: Coordinate) -> Self {
        Self {
            point,
            limit: None,
            language: None,
            access_key: None,
        }
    }
}

impl KeyOverride for ReverseParameters {
    fn api_key(&self) -> Option<&str> {
        self.access_key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub data: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub neighbourhood: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
    /// Metres from the reverse geocoding point.
    #[serde(default)]
    pub distance: Option<f64>,
}

impl Location {
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

pub struct PositionstackService {
    executor: ClientExecutor,
    keys: Arc<KeyContainer>,
    base_url: String,
}

impl PositionstackService {
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
    ) -> Result<GeocodeResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("access_key", key)
            .push("query", &params.query)
            .push_opt("limit", params.limit)
            .countries("country", params)
            .push_opt("region", params.region.as_deref())
            .push_opt("language", params.language.as_deref())
            .to_uri(&format!("{}/forward", self.base_url));
        self.executor.call(&uri, cancel).await
    }

    pub async fn reverse(
        &self,
        params: &ReverseParameters,
        cancel: &CancellationToken,
    ) -> Result<GeocodeResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("access_key", key)
            .push("query", params.point.lat_lon())
            .push_opt("limit", params.limit)
            .push_opt("language", params.language.as_deref())
            .to_uri(&format!("{}/reverse", self.base_url));
        self.executor.call(&uri, cancel).await
    }

    async fn geocode_places(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = ForwardParameters::new(request.query.as_str())?;
        params.limit = Some(request.limit);
        params.countries = request.countries.clone();
        let response = self.forward(&params, cancel).await?;
        Ok(normalize(response))
    }

    async fn reverse_places(
        &self,
        request: &ReverseRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = ReverseParameters::new(request.coordinate);
        params.limit = Some(request.limit);
        let response = self.reverse(&params, cancel).await?;
        Ok(normalize(response))
    }
}

fn normalize(response: GeocodeResponse) -> Vec<Place> {
    response
        .data
        .into_iter()
        .map(|location| {
            let coordinate = location.coordinate();
            let label = location
                .label
                .or(location.name)
                .unwrap_or_else(|| coordinate.lat_lon());
            Place::new(ProviderId::Positionstack, label, coordinate)
                .with_confidence(location.confidence)
        })
        .collect()
}

impl Geocoder for PositionstackService {
    fn provider(&self) -> ProviderId {
        ProviderId::Positionstack
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
    use crate::error::FailureKind;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};

    const DATA: &str = r#"{"data":[{
        "latitude": 38.897675,
        "longitude": -77.036547,
        "label": "1600 Pennsylvania Avenue NW, Washington, DC, USA",
        "name": "1600 Pennsylvania Avenue NW",
        "type": "address",
        "number": "1600",
        "street": "Pennsylvania Avenue NW",
        "postal_code": "20500",
        "confidence": 1,
        "region": "District of Columbia",
        "region_code": "DC",
        "administrative_area": null,
        "neighbourhood": "White House Grounds",
        "country": "United States",
        "country_code": "US"
    }]}"#;

    fn service(client: Arc<ScriptedHttpClient>) -> PositionstackService {
        PositionstackService::new(
            ClientExecutor::new(ProviderId::Positionstack, client),
            Arc::new(KeyContainer::with_key(ProviderId::Positionstack, "ps-key")),
        )
    }

    #[tokio::test]
    async fn forward_builds_uri_with_country_filter() {
        let client = Arc::new(ScriptedHttpClient::replying(DATA));
        let mut params = ForwardParameters::new("1600 Pennsylvania Ave").expect("valid");
        params.countries = vec![String::from("US")];
        params.limit = Some(1);

        let response = service(client.clone())
            .forward(&params, &CancellationToken::new())
            .await
            .expect("response");

        assert_eq!(response.data[0].region_code.as_deref(), Some("DC"));
        assert_eq!(
            client.requests()[0].url,
            format!("{BASE_URL}/forward?access_key=ps-key&query=1600%20Pennsylvania%20Ave&limit=1&country=US")
        );
    }

    #[tokio::test]
    async fn reverse_geocoder_returns_labelled_places() {
        let client = Arc::new(ScriptedHttpClient::replying(DATA));
        let request =
            ReverseRequest::new(Coordinate::new(38.8977, -77.0365).expect("valid"), 1).expect("valid");

        let places = Geocoder::reverse_geocode(&service(client.clone()), &request, &CancellationToken::new())
            .await
            .expect("places");

        assert_eq!(places[0].label, "1600 Pennsylvania Avenue NW, Washington, DC, USA");
        assert_eq!(places[0].confidence, Some(1.0));
        assert!(client.requests()[0].url.contains("query=38.8977%2C-77.0365"));
    }

    #[tokio::test]
    async fn invalid_access_key_is_a_status_failure_with_body() {
        let body = r#"{"error":{"code":"invalid_access_key","message":"You have not supplied a valid API Access Key."}}"#;
        let client = Arc::new(ScriptedHttpClient::new().then_reply(HttpResponse::with_status(401, body)));
        let params = ForwardParameters::new("x").expect("valid");

        let error = service(client)
            .forward(&params, &CancellationToken::new())
            .await
            .expect_err("must fail");

        let provider_error = error.as_provider_error().expect("provider error");
        assert_eq!(provider_error.kind(), FailureKind::Status);
        assert_eq!(provider_error.body(), Some(body));
    }
}
