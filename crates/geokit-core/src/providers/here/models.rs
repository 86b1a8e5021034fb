use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::convert::{deserialize_discriminated, into_shape, wire_enum, KeyDiscriminated, KeyRules};
use crate::{BoundingBox, Coordinate};

wire_enum! {
    pub enum ResultType [fallback = Unknown] {
        Place = "place",
        Locality = "locality",
        Street = "street",
        HouseNumber = "houseNumber",
        Intersection = "intersection",
        AddressBlock = "addressBlock",
        AdministrativeArea = "administrativeArea",
        PostalCodePoint = "postalCodePoint",
        ChainQuery = "chainQuery",
        CategoryQuery = "categoryQuery",
        Unknown = "unknown",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl From<Position> for Coordinate {
    fn from(value: Position) -> Self {
        Self {
            latitude: value.lat,
            longitude: value.lng,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl From<MapView> for BoundingBox {
    fn from(value: MapView) -> Self {
        Self {
            south: value.south,
            west: value.west,
            north: value.north,
            east: value.east,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoring {
    #[serde(default)]
    pub query_score: Option<f64>,
}

/// `/v1/geocode` and `/v1/revgeocode` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub items: Vec<GeocodeItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeItem {
    pub title: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result_type: Option<ResultType>,
    #[serde(default)]
    pub address: Address,
    pub position: Position,
    #[serde(default)]
    pub map_view: Option<MapView>,
    #[serde(default)]
    pub scoring: Option<Scoring>,
    /// Metres from the reverse geocoding point.
    #[serde(default)]
    pub distance: Option<f64>,
}

/// `/v1/autosuggest` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutosuggestResponse {
    #[serde(default)]
    pub items: Vec<AutosuggestItem>,
}

/// Suggestion entry; its shape depends on whether it resolves to a place or
/// to a follow-up query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AutosuggestItem {
    Location(AutosuggestLocation),
    Query(AutosuggestQuery),
    Entity(AutosuggestEntity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosuggestKind {
    Location,
    Query,
    Entity,
}

impl KeyDiscriminated for AutosuggestItem {
    type Kind = AutosuggestKind;

    const RULES: KeyRules<AutosuggestKind> = KeyRules::new(
        &[
            ("position", AutosuggestKind::Location),
            ("href", AutosuggestKind::Query),
        ],
        AutosuggestKind::Entity,
    );

    fn from_kind(kind: AutosuggestKind, object: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            AutosuggestKind::Location => Self::Location(into_shape(object)?),
            AutosuggestKind::Query => Self::Query(into_shape(object)?),
            AutosuggestKind::Entity => Self::Entity(into_shape(object)?),
        })
    }
}

impl<'de> Deserialize<'de> for AutosuggestItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_discriminated(deserializer)
    }
}

impl AutosuggestItem {
    pub fn title(&self) -> &str {
        match self {
            Self::Location(item) => &item.title,
            Self::Query(item) => &item.title,
            Self::Entity(item) => &item.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosuggestLocation {
    pub title: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result_type: Option<ResultType>,
    #[serde(default)]
    pub address: Address,
    pub position: Position,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosuggestQuery {
    pub title: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result_type: Option<ResultType>,
    /// Follow-up request that expands this suggestion.
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosuggestEntity {
    pub title: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result_type: Option<ResultType>,
}
