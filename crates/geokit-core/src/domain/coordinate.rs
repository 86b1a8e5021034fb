use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// A WGS84 position in decimal degrees.
///
/// Fields are public so decoders can build values straight from provider
/// payloads; [`Coordinate::new`] validates ranges for caller input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "latitude" });
        }
        if !longitude.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "longitude" });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange {
                value: latitude.to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange {
                value: longitude.to_string(),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// `"lat,lon"`, the form most providers accept for reverse lookups.
    pub fn lat_lon(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// `"lon,lat"`, used by MapBox paths and ArcGIS `location`.
    pub fn lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Rectangular extent in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        let in_latitude = (self.south..=self.north).contains(&coordinate.latitude);
        let in_longitude = if self.west <= self.east {
            (self.west..=self.east).contains(&coordinate.longitude)
        } else {
            // crosses the antimeridian
            coordinate.longitude >= self.west || coordinate.longitude <= self.east
        };
        in_latitude && in_longitude
    }
}
