use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::convert::{deserialize_discriminated, into_shape, wire_enum, KeyDiscriminated, KeyRules};
use crate::{BoundingBox, Coordinate};

wire_enum! {
    /// `Addr_type` values; also accepted by `featureTypes` on reverse lookups.
    pub enum AddressType [fallback = Unknown] {
        PointAddress,
        StreetAddress,
        StreetAddressExt,
        StreetIntersection = "StreetInt",
        StreetName,
        DistanceMarker,
        Poi = "POI",
        Subaddress,
        Postal,
        PostalExt,
        PostalLocality = "PostalLoc",
        Locality,
        LatLong,
        Mgrs = "MGRS",
        Unknown,
    }
}

wire_enum! {
    /// `category` filter values for candidate searches.
    pub enum Category {
        Address,
        PointAddress = "Point Address",
        StreetAddress = "Street Address",
        Postal,
        PopulatedPlace = "Populated Place",
        Poi = "POI",
        Coordinate = "Coordinate System",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialReference {
    #[serde(default)]
    pub wkid: Option<u32>,
    #[serde(rename = "latestWkid", default)]
    pub latest_wkid: Option<u32>,
}

/// Point in the service's spatial reference (WGS84 unless requested otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn coordinate(self) -> Coordinate {
        Coordinate {
            latitude: self.y,
            longitude: self.x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    pub const fn bounds(self) -> BoundingBox {
        BoundingBox {
            south: self.ymin,
            west: self.xmin,
            north: self.ymax,
            east: self.xmax,
        }
    }
}

/// Error object ArcGIS embeds in otherwise successful (HTTP 200) responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl ErrorBody {
    /// 498 (invalid token) and 499 (token required).
    pub const fn is_token_error(&self) -> bool {
        matches!(self.code, 498 | 499)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResponse {
    #[serde(rename = "spatialReference", default)]
    pub spatial_reference: Option<SpatialReference>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub address: String,
    pub location: Point,
    pub score: f64,
    #[serde(default)]
    pub attributes: Option<Attribute>,
    #[serde(default)]
    pub extent: Option<Extent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: Option<Attribute>,
    #[serde(default)]
    pub location: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Attribute bag whose shape depends on which output fields came back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Attribute {
    Address(AddressAttributes),
    Location(LocationAttributes),
    Place(PlaceAttributes),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Address,
    Location,
    Place,
}

impl KeyDiscriminated for Attribute {
    type Kind = AttributeKind;

    const RULES: KeyRules<AttributeKind> = KeyRules::new(
        &[
            ("Match_addr", AttributeKind::Address),
            ("LongLabel", AttributeKind::Location),
        ],
        AttributeKind::Place,
    );

    fn from_kind(kind: AttributeKind, object: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            AttributeKind::Address => Self::Address(into_shape(object)?),
            AttributeKind::Location => Self::Location(into_shape(object)?),
            AttributeKind::Place => Self::Place(into_shape(object)?),
        })
    }
}

impl<'de> Deserialize<'de> for Attribute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_discriminated(deserializer)
    }
}

impl Attribute {
    /// Best human-readable label the variant carries.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Address(address) => Some(address.match_address.as_str()),
            Self::Location(location) => Some(location.long_label.as_str()),
            Self::Place(place) => place.place_address.as_deref().or(place.place_name.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressAttributes {
    #[serde(rename = "Match_addr")]
    pub match_address: String,
    #[serde(rename = "Addr_type", default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(rename = "LongLabel", default, skip_serializing_if = "Option::is_none")]
    pub long_label: Option<String>,
    #[serde(rename = "ShortLabel", default, skip_serializing_if = "Option::is_none")]
    pub short_label: Option<String>,
    #[serde(rename = "StAddr", default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(rename = "City", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "Region", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "Postal", default, skip_serializing_if = "Option::is_none")]
    pub postal: Option<String>,
    #[serde(rename = "CntryName", default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(rename = "CountryCode", default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(rename = "Score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAttributes {
    #[serde(rename = "LongLabel")]
    pub long_label: String,
    #[serde(rename = "ShortLabel", default, skip_serializing_if = "Option::is_none")]
    pub short_label: Option<String>,
    #[serde(rename = "Addr_type", default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    #[serde(rename = "City", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "Region", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "CntryCode", default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceAttributes {
    #[serde(rename = "PlaceName", default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(rename = "Place_addr", default, skip_serializing_if = "Option::is_none")]
    pub place_address: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    #[serde(rename = "Phone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Output fields without a dedicated member.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}
