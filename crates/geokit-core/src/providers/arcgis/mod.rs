//! ArcGIS World Geocoding Service.
//!
//! Requests are authorized with an OAuth token obtained through the
//! client-credentials flow ([`ArcGisTokenRetrieval`]) and cached in a shared
//! [`TokenContainer`]. ArcGIS reports errors inside HTTP 200 bodies; token
//! errors (498/499) drop the cached token so the next call refreshes it.

mod models;
mod token;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

pub use models::{
    AddressAttributes, AddressType, Attribute, AttributeKind, Candidate, CandidateResponse,
    Category, ErrorBody, Extent, LocationAttributes, PlaceAttributes, Point, ReverseResponse,
    SpatialReference,
};
pub use token::{ArcGisTokenRetrieval, TOKEN_URL};

use crate::convert::WireEnum;
use crate::credentials::TokenContainer;
use crate::error::{FailureKind, GeocodingError, ProviderError, ValidationError};
use crate::executor::ClientExecutor;
use crate::geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};
use crate::query::{CountryFilter, LayerFilter, QueryString};
use crate::{Coordinate, Place, ProviderId};

pub const BASE_URL: &str =
    "https://geocode-api.arcgis.com/arcgis/rest/services/World/GeocodeServer";

/// `findAddressCandidates` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateParameters {
    pub single_line: String,
    pub max_locations: Option<usize>,
    pub country_codes: Vec<String>,
    pub categories: Vec<Category>,
    /// Biases results towards this point.
    pub location: Option<Coordinate>,
    pub out_fields: String,
}

impl CandidateParameters {
    pub fn new(single_line: impl Into<String>) -> Result<Self, ValidationError> {
        let single_line = single_line.into();
        if single_line.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self {
            single_line,
            max_locations: None,
            country_codes: Vec::new(),
            categories: Vec::new(),
            location: None,
            out_fields: String::from("*"),
        })
    }
}

impl CountryFilter for CandidateParameters {
    fn countries(&self) -> &[String] {
        &self.country_codes
    }
}

impl LayerFilter for CandidateParameters {
    fn layers(&self) -> Vec<&'static str> {
        self.categories.iter().map(|category| category.as_wire()).collect()
    }
}

/// `reverseGeocode` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseParameters {
    pub location: Coordinate,
    pub feature_types: Vec<AddressType>,
    pub lang_code: Option<String>,
}

impl ReverseParameters {
    pub fn new(location: Coordinate) -> Self {
        Self {
            location,
            feature_types: Vec::new(),
            lang_code: None,
        }
    }
}

impl LayerFilter for ReverseParameters {
    fn layers(&self) -> Vec<&'static str> {
        self.feature_types.iter().map(|kind| kind.as_wire()).collect()
    }
}

pub struct ArcGisService {
    executor: ClientExecutor,
    tokens: Arc<TokenContainer>,
    base_url: String,
}

impl ArcGisService {
    pub fn new(executor: ClientExecutor, tokens: Arc<TokenContainer>) -> Self {
        Self {
            executor,
            tokens,
            base_url: BASE_URL.to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn find_candidates(
        &self,
        params: &CandidateParameters,
        cancel: &CancellationToken,
    ) -> Result<CandidateResponse, GeocodingError> {
        let token = self.tokens.token(cancel).await?;
        let uri = QueryString::new()
            .push("SingleLine", &params.single_line)
            .push("f", "json")
            .push("outFields", &params.out_fields)
            .push_opt("maxLocations", params.max_locations)
            .countries("countryCode", params)
            .layers("category", params)
            .push_opt("location", params.location.map(|point| point.lon_lat()))
            .push("token", token.access_token())
            .to_uri(&format!("{}/findAddressCandidates", self.base_url));

        let response: CandidateResponse = self.executor.call(&uri, cancel).await?;
        self.check(response.error.as_ref()).await?;
        Ok(response)
    }

    pub async fn reverse_geocode(
        &self,
        params: &ReverseParameters,
        cancel: &CancellationToken,
    ) -> Result<ReverseResponse, GeocodingError> {
        let token = self.tokens.token(cancel).await?;
        let uri = QueryString::new()
            .push("location", params.location.lon_lat())
            .push("f", "json")
            .layers("featureTypes", params)
            .push_opt("langCode", params.lang_code.as_deref())
            .push("token", token.access_token())
            .to_uri(&format!("{}/reverseGeocode", self.base_url));

        let response: ReverseResponse = self.executor.call(&uri, cancel).await?;
        self.check(response.error.as_ref()).await?;
        Ok(response)
    }

    async fn check(&self, error: Option<&ErrorBody>) -> Result<(), GeocodingError> {
        let Some(error) = error else {
            return Ok(());
        };

        let kind = if error.is_token_error() {
            warn!(code = error.code, "arcgis rejected the access token");
            self.tokens.invalidate().await;
            FailureKind::Credential
        } else {
            FailureKind::Status
        };

        let mut failure = ProviderError::new(ProviderId::Arcgis, kind, error.message.clone());
        if let Ok(code) = u16::try_from(error.code) {
            failure = failure.with_status(code);
        }
        Err(failure.into())
    }

    async fn geocode_places(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let mut params = CandidateParameters::new(request.query.as_str())?;
        params.max_locations = Some(request.limit);
        params.country_codes = request.countries.clone();

        let response = self.find_candidates(&params, cancel).await?;
        Ok(response
            .candidates
            .into_iter()
            .take(request.limit)
            .map(|candidate| {
                Place::new(
                    ProviderId::Arcgis,
                    candidate.address,
                    candidate.location.coordinate(),
                )
                .with_bounds(candidate.extent.map(Extent::bounds))
                .with_confidence(Some(candidate.score / 100.0))
            })
            .collect())
    }

    async fn reverse_places(
        &self,
        request: &ReverseRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let response = self
            .reverse_geocode(&ReverseParameters::new(request.coordinate), cancel)
            .await?;
        let label = response
            .address
            .as_ref()
            .and_then(Attribute::label)
            .map(str::to_owned);

        Ok(match (label, response.location) {
            (Some(label), Some(location)) => {
                vec![Place::new(ProviderId::Arcgis, label, location.coordinate())]
            }
            _ => Vec::new(),
        })
    }
}

impl Geocoder for ArcGisService {
    fn provider(&self) -> ProviderId {
        ProviderId::Arcgis
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
    use crate::credentials::{Credentials, Token};
    use crate::http_client::ScriptedHttpClient;

    const CANDIDATES: &str = r#"{
        "spatialReference": {"wkid": 4326, "latestWkid": 4326},
        "candidates": [{
            "address": "380 New York St, Redlands, California, 92373",
            "location": {"x": -117.19487, "y": 34.05723},
            "score": 100,
            "attributes": {"Match_addr": "380 New York St, Redlands, California, 92373", "Addr_type": "PointAddress"},
            "extent": {"xmin": -117.19587, "ymin": 34.05623, "xmax": -117.19387, "ymax": 34.05823}
        }]
    }"#;

    fn service(client: Arc<ScriptedHttpClient>) -> (ArcGisService, Arc<TokenContainer>) {
        let executor = ClientExecutor::new(ProviderId::Arcgis, client);
        let tokens = Arc::new(
            TokenContainer::new(
                ProviderId::Arcgis,
                Credentials::new("id", "secret"),
                Arc::new(ArcGisTokenRetrieval::new(executor.clone())),
            )
            .with_token(Token::new("cached-token", 7200)),
        );
        (ArcGisService::new(executor, tokens.clone()), tokens)
    }

    #[tokio::test]
    async fn find_candidates_builds_query_with_token() {
        let client = Arc::new(ScriptedHttpClient::replying(CANDIDATES));
        let (service, _) = service(client.clone());
        let mut params = CandidateParameters::new("380 New York St").expect("valid");
        params.max_locations = Some(2);
        params.categories = vec![Category::PointAddress];

        let response = service
            .find_candidates(&params, &CancellationToken::new())
            .await
            .expect("candidates");

        assert_eq!(response.candidates.len(), 1);
        assert!(matches!(
            response.candidates[0].attributes,
            Some(Attribute::Address(_))
        ));
        assert_eq!(
            client.requests()[0].url,
            format!(
                "{BASE_URL}/findAddressCandidates?SingleLine=380%20New%20York%20St&f=json&outFields=%2A&maxLocations=2&category=Point%20Address&token=cached-token"
            )
        );
    }

    #[tokio::test]
    async fn geocoder_normalizes_score_and_extent() {
        let client = Arc::new(ScriptedHttpClient::replying(CANDIDATES));
        let (service, _) = service(client);
        let request = GeocodeRequest::new("380 New York St", 5).expect("valid");

        let places = service
            .geocode(&request, &CancellationToken::new())
            .await
            .expect("places");

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].confidence, Some(1.0));
        assert_eq!(places[0].coordinate.latitude, 34.05723);
        assert!(places[0].bounds.is_some());
    }

    #[tokio::test]
    async fn reverse_uses_location_variant_label() {
        let client = Arc::new(ScriptedHttpClient::replying(
            r#"{"address":{"LongLabel":"Redlands, CA, USA","Addr_type":"Locality"},"location":{"x":-117.18,"y":34.05}}"#,
        ));
        let (service, _) = service(client.clone());
        let point = Coordinate::new(34.05, -117.18).expect("valid");
        let request = ReverseRequest::new(point, 1).expect("valid");

        let places = Geocoder::reverse_geocode(&service, &request, &CancellationToken::new())
            .await
            .expect("places");

        assert_eq!(places[0].label, "Redlands, CA, USA");
        assert!(client.requests()[0].url.contains("location=-117.18%2C34.05"));
    }

    #[tokio::test]
    async fn invalid_token_error_drops_cached_token() {
        let client = Arc::new(ScriptedHttpClient::replying(
            r#"{"error":{"code":498,"message":"Invalid Token","details":[]}}"#,
        ));
        let (service, tokens) = service(client);
        let params = CandidateParameters::new("x").expect("valid");

        let error = service
            .find_candidates(&params, &CancellationToken::new())
            .await
            .expect_err("must fail");

        assert_eq!(error.failure_kind(), Some(FailureKind::Credential));
        assert!(tokens.cached().await.is_none());
    }

    #[tokio::test]
    async fn other_embedded_errors_are_status_failures() {
        let client = Arc::new(ScriptedHttpClient::replying(
            r#"{"error":{"code":400,"message":"Unable to complete operation.","details":[]}}"#,
        ));
        let (service, tokens) = service(client);
        let params = CandidateParameters::new("x").expect("valid");

        let error = service
            .find_candidates(&params, &CancellationToken::new())
            .await
            .expect_err("must fail");

        let provider_error = error.as_provider_error().expect("provider error");
        assert_eq!(provider_error.kind(), FailureKind::Status);
        assert_eq!(provider_error.status_code(), Some(400));
        assert!(tokens.cached().await.is_some());
    }
}
