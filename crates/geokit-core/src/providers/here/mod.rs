//! HERE Geocoding & Search v7.

mod models;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub use models::{
    Address, AutosuggestEntity, AutosuggestItem, AutosuggestKind, AutosuggestLocation,
    AutosuggestQuery, AutosuggestResponse, GeocodeItem, GeocodeResponse, MapView, Position,
    ResultType, Scoring,
};

use crate::credentials::KeyContainer;
use crate::error::{GeocodingError, ValidationError};
use crate::executor::ClientExecutor;
use crate::geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};
use crate::query::{resolve_key, CountryFilter, KeyOverride, QueryString};
use crate::{BoundingBox, Coordinate, Place, ProviderId};

/// Service roots, one host per HERE endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub geocode: String,
    pub reverse: String,
    pub autosuggest: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode: String::from("https://geocode.search.hereapi.com/v1/geocode"),
            reverse: String::from("https://revgeocode.search.hereapi.com/v1/revgeocode"),
            autosuggest: String::from("https://autosuggest.search.hereapi.com/v1/autosuggest"),
        }
    }
}

/// `in=countryCode:...` filter; HERE expects ISO 3166 alpha-3 codes.
fn country_filter<P: CountryFilter + ?Sized>(params: &P) -> Option<String> {
    let countries = params.countries();
    (!countries.is_empty()).then(|| format!("countryCode:{}", countries.join(",")))
}

fn require_query(query: String) -> Result<String, ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(query)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeParameters {
    pub query: String,
    pub limit: Option<usize>,
    pub countries: Vec<String>,
    pub lang: Option<String>,
    pub api_key: Option<String>,
}

impl GeocodeParameters {
    pub fn new(query: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            query: require_query(query.into())?,
            limit: None,
            countries: Vec::new(),
            lang: None,
            api_key: None,
        })
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
    pub at: Coordinate,
    pub limit: Option<usize>,
    pub lang: Option<String>,
    pub api_key: Option<String>,
}

impl ReverseParameters {
    pub fn new(at: Coordinate) -> Self {
        Self {
            at,
            limit: None,
            lang: None,
            api_key: None,
        }
    }
}

impl KeyOverride for ReverseParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// Autosuggest needs a search centre (`at`) or a country filter.
#[derive(Debug, Clone, PartialEq)]
pub struct AutosuggestParameters {
    pub query: String,
    pub at: Option<Coordinate>,
    pub limit: Option<usize>,
    pub countries: Vec<String>,
    pub lang: Option<String>,
    pub api_key: Option<String>,
}

impl AutosuggestParameters {
    pub fn new(query: impl Into<String>, at: Coordinate) -> Result<Self, ValidationError> {
        Ok(Self {
            query: require_query(query.into())?,
            at: Some(at),
            limit: None,
            countries: Vec::new(),
            lang: None,
            api_key: None,
        })
    }

    pub fn within_countries<I, S>(query: impl Into<String>, countries: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            query: require_query(query.into())?,
            at: None,
            limit: None,
            countries: countries.into_iter().map(Into::into).collect(),
            lang: None,
            api_key: None,
        })
    }
}

impl CountryFilter for AutosuggestParameters {
    fn countries(&self) -> &[String] {
        &self.countries
    }
}

impl KeyOverride for AutosuggestParameters {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

pub struct HereService {
    executor: ClientExecutor,
    keys: Arc<KeyContainer>,
    endpoints: Endpoints,
}

impl HereService {
    pub fn new(executor: ClientExecutor, keys: Arc<KeyContainer>) -> Self {
        Self {
            executor,
            keys,
            endpoints: Endpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub async fn geocode(
        &self,
        params: &GeocodeParameters,
        cancel: &CancellationToken,
    ) -> Result<GeocodeResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("q", &params.query)
            .push_opt("limit", params.limit)
            .push_opt("in", country_filter(params))
            .push_opt("lang", params.lang.as_deref())
            .push("apiKey", key)
            .to_uri(&self.endpoints.geocode);
        self.executor.call(&uri, cancel).await
    }

    pub async fn reverse_geocode(
        &self,
        params: &ReverseParameters,
        cancel: &CancellationToken,
    ) -> Result<GeocodeResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("at", params.at.lat_lon())
            .push_opt("limit", params.limit)
            .push_opt("lang", params.lang.as_deref())
            .push("apiKey", key)
            .to_uri(&self.endpoints.reverse);
        self.executor.call(&uri, cancel).await
    }

    pub async fn autosuggest(
        &self,
        params: &AutosuggestParameters,
        cancel: &CancellationToken,
    ) -> Result<AutosuggestResponse, GeocodingError> {
        let key = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push("q", &params.query)
            .push_opt("at", params.at.map(|at| at.lat_lon()))
            .push_opt("in", country_filter(params))
            .push_opt("limit", params.limit)
            .push_opt("lang", params.lang.as_deref())
            .push("apiKey", key)
            .to_uri(&self.endpoints.autosuggest);
        self.executor.call(&uri, cancel).await
    }

    async fn geocode_places(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = GeocodeParameters::new(request.query.as_str())?;
        params.limit = Some(request.limit);
        params.countries = request.countries.clone();
        let response = self.geocode(&params, cancel).await?;
        Ok(normalize(response))
    }

    async fn reverse_places(
        &self,
        request: &ReverseRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = ReverseParameters::new(request.coordinate);
        params.limit = Some(request.limit);
        let response = self.reverse_geocode(&params, cancel).await?;
        Ok(normalize(response))
    }
}

fn normalize(response: GeocodeResponse) -> Vec<Place> {
    response
        .items
        .into_iter()
        .map(|item| {
            let label = item.address.label.unwrap_or(item.title);
            Place::new(ProviderId::Here, label, item.position.into())
                .with_bounds(item.map_view.map(BoundingBox::from))
                .with_confidence(item.scoring.and_then(|scoring| scoring.query_score))
        })
        .collect()
}

impl Geocoder for HereService {
    fn provider(&self) -> ProviderId {
        ProviderId::Here
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

    const GEOCODE: &str = r#"{"items":[{
        "title": "Invalidenstraße 116, 10115 Berlin, Deutschland",
        "id": "here:af:streetsection:tVuvjJYhVDOA",
        "resultType": "houseNumber",
        "houseNumberType": "PA",
        "address": {"label": "Invalidenstraße 116, 10115 Berlin, Deutschland", "countryCode": "DEU", "city": "Berlin", "postalCode": "10115"},
        "position": {"lat": 52.53041, "lng": 13.38527},
        "mapView": {"west": 13.38379, "south": 52.52951, "east": 13.38675, "north": 52.53131},
        "scoring": {"queryScore": 1.0}
    }]}"#;

    fn service(client: Arc<ScriptedHttpClient>) -> HereService {
        HereService::new(
            ClientExecutor::new(ProviderId::Here, client),
            Arc::new(KeyContainer::with_key(ProviderId::Here, "here-key")),
        )
    }

    #[tokio::test]
    async fn geocode_sends_country_filter_and_decodes_items() {
        let client = Arc::new(ScriptedHttpClient::replying(GEOCODE));
        let mut params = GeocodeParameters::new("Invalidenstraße 116 Berlin").expect("valid");
        params.countries = vec![String::from("DEU")];

        let response = service(client.clone())
            .geocode(&params, &CancellationToken::new())
            .await
            .expect("response");

        assert_eq!(response.items[0].result_type, Some(ResultType::HouseNumber));
        assert_eq!(
            client.requests()[0].url,
            "https://geocode.search.hereapi.com/v1/geocode?q=Invalidenstra%C3%9Fe%20116%20Berlin&in=countryCode%3ADEU&apiKey=here-key"
        );
    }

    #[tokio::test]
    async fn geocoder_uses_map_view_and_query_score() {
        let client = Arc::new(ScriptedHttpClient::replying(GEOCODE));
        let request = GeocodeRequest::new("Invalidenstraße 116", 1).expect("valid");

        let places = Geocoder::geocode(&service(client), &request, &CancellationToken::new())
            .await
            .expect("places");

        assert_eq!(places[0].confidence, Some(1.0));
        assert_eq!(places[0].bounds.map(|bounds| bounds.north), Some(52.53131));
    }

    #[tokio::test]
    async fn autosuggest_returns_polymorphic_items() {
        let client = Arc::new(ScriptedHttpClient::replying(
            r#"{"items":[
                {"title":"Berlin","resultType":"locality","address":{"label":"Berlin, Deutschland"},"position":{"lat":52.51604,"lng":13.37691}},
                {"title":"Berliner Straße","resultType":"categoryQuery","href":"https://autosuggest.search.hereapi.com/v1/discover?q=Berliner"}
            ]}"#,
        ));
        let params =
            AutosuggestParameters::new("Berl", Coordinate::new(52.5, 13.4).expect("valid"))
                .expect("valid");

        let response = service(client.clone())
            .autosuggest(&params, &CancellationToken::new())
            .await
            .expect("response");

        assert!(matches!(response.items[0], AutosuggestItem::Location(_)));
        assert!(matches!(response.items[1], AutosuggestItem::Query(_)));
        assert!(client.requests()[0].url.contains("at=52.5%2C13.4"));
    }

    #[tokio::test]
    async fn unauthorized_is_a_status_failure() {
        let client = Arc::new(ScriptedHttpClient::new().then_reply(HttpResponse::with_status(
            401,
            r#"{"error":"Unauthorized","error_description":"apiKey invalid. apiKey not found."}"#,
        )));
        let params = ReverseParameters::new(Coordinate::new(52.5, 13.4).expect("valid"));

        let error = service(client)
            .reverse_geocode(&params, &CancellationToken::new())
            .await
            .expect_err("must fail");

        let provider_error = error.as_provider_error().expect("provider error");
        assert_eq!(provider_error.kind(), FailureKind::Status);
        assert_eq!(provider_error.status_code(), Some(401));
    }
}
