//! Fixed-arity numeric arrays mapped onto [`Coordinate`] and [`BoundingBox`].
//!
//! Every converter here applies the same policy: the array must hold exactly
//! the expected count of numbers, anything else is a decode error. Providers
//! disagree on axis order, so each order gets its own module for use with
//! `#[serde(with = "...")]`:
//!
//! | Module | Layout |
//! |--------|--------|
//! | [`lat_lon`] | `[latitude, longitude]` |
//! | [`lon_lat`] | `[longitude, latitude]` |
//! | [`south_west_north_east`] | `[south, west, north, east]` |
//! | [`west_south_east_north`] | `[west, south, east, north]` |
//!
//! Each module has an `option` submodule for nullable or missing fields
//! (combine with `#[serde(default)]`).

use std::fmt::Formatter;
use std::marker::PhantomData;

use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::{BoundingBox, Coordinate};

/// Exactly `N` numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedArray<const N: usize>(pub [f64; N]);

impl<'de, const N: usize> Deserialize<'de> for FixedArray<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(FixedArrayVisitor::<N>(PhantomData))
    }
}

struct FixedArrayVisitor<const N: usize>(PhantomData<[f64; N]>);

impl<'de, const N: usize> Visitor<'de> for FixedArrayVisitor<N> {
    type Value = FixedArray<N>;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "an array of exactly {N} numbers")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = [0.0_f64; N];
        for (index, slot) in values.iter_mut().enumerate() {
            *slot = seq
                .next_element::<f64>()?
                .ok_or_else(|| de::Error::invalid_length(index, &self))?;
        }

        let mut extra = 0;
        while seq.next_element::<IgnoredAny>()?.is_some() {
            extra += 1;
        }
        if extra > 0 {
            return Err(de::Error::invalid_length(N + extra, &self));
        }

        Ok(FixedArray(values))
    }
}

macro_rules! array_layout {
    ($(#[$meta:meta])* $module:ident, $target:ty, $len:literal, |$values:ident| $decode:expr, |$item:ident| $encode:expr) => {
        $(#[$meta])*
        pub mod $module {
            use serde::{Deserialize, Deserializer, Serialize, Serializer};

            use super::FixedArray;
            #[allow(unused_imports)]
            use crate::{BoundingBox, Coordinate};

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$target, D::Error> {
                let FixedArray($values) = FixedArray::<$len>::deserialize(deserializer)?;
                Ok($decode)
            }

            pub fn serialize<S: Serializer>($item: &$target, serializer: S) -> Result<S::Ok, S::Error> {
                let values: [f64; $len] = $encode;
                values.serialize(serializer)
            }

            pub mod option {
                use serde::{Deserialize, Deserializer, Serialize, Serializer};

                use super::super::FixedArray;
                #[allow(unused_imports)]
                use crate::{BoundingBox, Coordinate};

                pub fn deserialize<'de, D: Deserializer<'de>>(
                    deserializer: D,
                ) -> Result<Option<$target>, D::Error> {
                    let raw = Option::<FixedArray<$len>>::deserialize(deserializer)?;
                    Ok(raw.map(|FixedArray($values)| $decode))
                }

                pub fn serialize<S: Serializer>(
                    value: &Option<$target>,
                    serializer: S,
                ) -> Result<S::Ok, S::Error> {
                    match value {
                        Some($item) => {
                            let values: [f64; $len] = $encode;
                            values.serialize(serializer)
                        }
                        None => serializer.serialize_none(),
                    }
                }
            }
        }
    };
}

array_layout!(
    /// `[latitude, longitude]`
    lat_lon,
    Coordinate,
    2,
    |values| Coordinate { latitude: values[0], longitude: values[1] },
    |point| [point.latitude, point.longitude]
);

array_layout!(
    /// `[longitude, latitude]` (GeoJSON order)
    lon_lat,
    Coordinate,
    2,
    |values| Coordinate { latitude: values[1], longitude: values[0] },
    |point| [point.longitude, point.latitude]
);

array_layout!(
    /// `[south, west, north, east]`
    south_west_north_east,
    BoundingBox,
    4,
    |values| BoundingBox { south: values[0], west: values[1], north: values[2], east: values[3] },
    |bounds| [bounds.south, bounds.west, bounds.north, bounds.east]
);

array_layout!(
    /// `[west, south, east, north]` (GeoJSON `bbox` order)
    west_south_east_north,
    BoundingBox,
    4,
    |values| BoundingBox { south: values[1], west: values[0], north: values[3], east: values[2] },
    |bounds| [bounds.west, bounds.south, bounds.east, bounds.north]
);

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct LatLonPoint {
        #[serde(with = "lat_lon")]
        coordinates: Coordinate,
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct GeoJsonFeature {
        #[serde(with = "lon_lat")]
        center: Coordinate,
        #[serde(default, with = "west_south_east_north::option")]
        bbox: Option<BoundingBox>,
    }

    #[derive(Debug, Deserialize)]
    struct Resource {
        #[serde(with = "south_west_north_east")]
        bbox: BoundingBox,
    }

    #[test]
    fn lat_lon_keeps_axis_order() {
        let point: LatLonPoint =
            serde_json::from_str(r#"{"coordinates":[40.7,-73.9]}"#).expect("decodes");
        assert_eq!(point.coordinates.latitude, 40.7);
        assert_eq!(point.coordinates.longitude, -73.9);
    }

    #[test]
    fn three_numbers_for_a_coordinate_is_an_error() {
        let error = serde_json::from_str::<LatLonPoint>(r#"{"coordinates":[40.7,-73.9,10.0]}"#)
            .expect_err("must fail");
        let message = error.to_string();
        assert!(message.contains("invalid length 3"), "{message}");
        assert!(message.contains("exactly 2 numbers"), "{message}");
    }

    #[test]
    fn short_array_is_an_error() {
        let error =
            serde_json::from_str::<LatLonPoint>(r#"{"coordinates":[40.7]}"#).expect_err("must fail");
        assert!(error.to_string().contains("invalid length 1"));
    }

    #[test]
    fn non_numeric_member_is_an_error() {
        let error = serde_json::from_str::<LatLonPoint>(r#"{"coordinates":["40.7",-73.9]}"#)
            .expect_err("must fail");
        assert!(error.to_string().contains("invalid type"));
    }

    #[test]
    fn south_west_north_east_assigns_fields_in_declared_order() {
        let resource: Resource =
            serde_json::from_str(r#"{"bbox":[40.1,-74.2,40.9,-73.7]}"#).expect("decodes");
        assert_eq!(
            resource.bbox,
            BoundingBox {
                south: 40.1,
                west: -74.2,
                north: 40.9,
                east: -73.7
            }
        );
    }

    #[test]
    fn bounding_box_with_five_numbers_is_an_error() {
        let error = serde_json::from_str::<Resource>(r#"{"bbox":[1.0,2.0,3.0,4.0,5.0]}"#)
            .expect_err("must fail");
        assert!(error.to_string().contains("invalid length 5"));
    }

    #[test]
    fn geojson_layout_decodes_and_encodes_in_lon_lat_order() {
        let feature: GeoJsonFeature = serde_json::from_str(
            r#"{"center":[-73.9,40.7],"bbox":[-74.2,40.1,-73.7,40.9]}"#,
        )
        .expect("decodes");
        assert_eq!(feature.center.latitude, 40.7);
        let bounds = feature.bbox.expect("bbox present");
        assert_eq!(bounds.west, -74.2);
        assert_eq!(bounds.north, 40.9);

        let json = serde_json::to_string(&feature).expect("encodes");
        assert_eq!(
            json,
            r#"{"center":[-73.9,40.7],"bbox":[-74.2,40.1,-73.7,40.9]}"#
        );
    }

    #[test]
    fn missing_and_null_optional_arrays_are_none() {
        let missing: GeoJsonFeature =
            serde_json::from_str(r#"{"center":[0.0,0.0]}"#).expect("decodes");
        let null: GeoJsonFeature =
            serde_json::from_str(r#"{"center":[0.0,0.0],"bbox":null}"#).expect("decodes");
        assert!(missing.bbox.is_none());
        assert!(null.bbox.is_none());
    }
}
