//! MapBox Geocoding v5 (`mapbox.places`).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::convert::arrays::{lon_lat, west_south_east_north};
use crate::convert::{wire_enum, WireEnum};
use crate::credentials::KeyContainer;
use crate::error::{GeocodingError, ValidationError};
use crate::executor::ClientExecutor;
use crate::geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};
use crate::query::{resolve_key, CountryFilter, KeyOverride, LayerFilter, QueryString};
use crate::{BoundingBox, Coordinate, Place, ProviderId};

pub const BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

wire_enum! {
    /// Feature types; also the values accepted by the `types` filter.
    pub enum PlaceType [fallback = Other] {
        Country = "country",
        Region = "region",
        Postcode = "postcode",
        District = "district",
        Place = "place",
        Locality = "locality",
        Neighborhood = "neighborhood",
        Address = "address",
        Poi = "poi",
        Other = "other",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardParameters {
    pub query: String,
    pub limit: Option<usize>,
    /// ISO 3166 alpha-2, lowercase on the wire.
    pub countries: Vec<String>,
    pub types: Vec<PlaceType>,
    pub proximity: Option<Coordinate>,
    pub bbox: Option<BoundingBox>,
    pub language: Option<String>,
    pub autocomplete: Option<bool>,
    pub access_token: Option<String>,
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
            types: Vec::new(),
            proximity: None,
            bbox: None,
            language: None,
            autocomplete: None,
            access_token: None,
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
        self.types.iter().map(|kind| kind.as_wire()).collect()
    }
}

impl KeyOverride for ForwardParameters {
    fn api_key(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseParameters {
    pub point: Coordinate,
    /// MapBox only honours `limit` on reverse lookups when exactly one type is set.
    pub limit: Option<usize>,
    pub types: Vec<PlaceType>,
    pub language: Option<String>,
    pub access_token: Option<String>,
}

impl ReverseParameters {
    pub fn new(point: Coordinate) -> Self {
        Self {
            point,
            limit: None,
            types: Vec::new(),
            language: None,
            access_token: None,
        }
    }
}

impl LayerFilter for ReverseParameters {
    fn layers(&self) -> Vec<&'static str> {
        self.types.iter().map(|kind| kind.as_wire()).collect()
    }
}

impl KeyOverride for ReverseParameters {
    fn api_key(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    /// Echo of the query: words for forward lookups, numbers for reverse.
    #[serde(default)]
    pub query: Vec<Value>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub attribution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub place_type: Vec<PlaceType>,
    #[serde(default)]
    pub relevance: f64,
    #[serde(default)]
    pub address: Option<String>,
    pub text: String,
    pub place_name: String,
    #[serde(with = "lon_lat")]
    pub center: Coordinate,
    pub geometry: Geometry,
    #[serde(default, with = "west_south_east_north::option")]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub context: Vec<Context>,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "lon_lat")]
    pub coordinates: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub wikidata: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub accuracy: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub landmark: Option<bool>,
    #[serde(default)]
    pub wikidata: Option<String>,
    #[serde(default)]
    pub short_code: Option<String>,
}

pub struct MapboxService {
    executor: ClientExecutor,
    keys: Arc<KeyContainer>,
    base_url: String,
}

impl MapboxService {
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
    ) -> Result<FeatureCollection, GeocodingError> {
        let token = resolve_key(params, &self.keys)?;
        let countries = params
            .countries()
            .iter()
            .map(|country| country.to_ascii_lowercase())
            .collect::<Vec<_>>();
        let uri = QueryString::new()
            .push_opt("limit", params.limit)
            .push_joined("country", &countries, ",")
            .layers("types", params)
            .push_opt("proximity", params.proximity.map(|point| point.lon_lat()))
            .push_opt(
                "bbox",
                params.bbox.map(|bbox| {
                    format!("{},{},{},{}", bbox.west, bbox.south, bbox.east, bbox.north)
                }),
            )
            .push_opt("language", params.language.as_deref())
            .push_opt("autocomplete", params.autocomplete)
            .push("access_token", token)
            .to_uri(&format!(
                "{}/{}.json",
                self.base_url,
                urlencoding::encode(&params.query)
            ));
        self.executor.call(&uri, cancel).await
    }

    pub async fn reverse(
        &self,
        params: &ReverseParameters,
        cancel: &CancellationToken,
    ) -> Result<FeatureCollection, GeocodingError> {
        let token = resolve_key(params, &self.keys)?;
        let uri = QueryString::new()
            .push_opt("limit", params.limit)
            .layers("types", params)
            .push_opt("language", params.language.as_deref())
            .push("access_token", token)
            .to_uri(&format!("{}/{}.json", self.base_url, params.point.lon_lat()));
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
        let collection = self.forward(&params, cancel).await?;
        Ok(normalize(collection, request.limit))
    }

    async fn reverse_places(
        &self,
        request: &ReverseRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, GeocodingError> {
        let collection = self
            .reverse(&ReverseParameters::new(request.coordinate), cancel)
            .await?;
        Ok(normalize(collection, request.limit))
    }
}

fn normalize(collection: FeatureCollection, limit: usize) -> Vec<Place> {
    collection
        .features
        .into_iter()
        .take(limit)
        .map(|feature| {
            Place::new(ProviderId::Mapbox, feature.place_name, feature.center)
                .with_bounds(feature.bbox)
                .with_confidence(Some(feature.relevance))
        })
        .collect()
}

impl Geocoder for MapboxService {
    fn provider(&self) -> ProviderId {
        ProviderId::Mapbox
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
