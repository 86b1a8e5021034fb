//! Provider-neutral geocoding contract.
//!
//! Each provider service exposes its own typed parameters and response
//! models. [`Geocoder`] sits on top of those so a caller can drive any
//! provider with the same request types and get [`Place`] values back.
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | [`geocode`](Geocoder::geocode) | [`GeocodeRequest`] | `Vec<Place>` |
//! | [`reverse_geocode`](Geocoder::reverse_geocode) | [`ReverseRequest`] | `Vec<Place>` |

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::{GeocodingError, ValidationError};
use crate::query::CountryFilter;
use crate::{Coordinate, Place, ProviderId};

/// Forward geocoding input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRequest {
    pub query: String,
    pub limit: usize,
    pub countries: Vec<String>,
}

impl GeocodeRequest {
    pub fn new(query: impl Into<String>, limit: usize) -> Result<Self, ValidationError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if limit == 0 {
            return Err(ValidationError::ZeroLimit);
        }
        Ok(Self {
            query: query.trim().to_owned(),
            limit,
            countries: Vec::new(),
        })
    }

    /// Restricts results to ISO 3166 alpha-2 or alpha-3 country codes.
    pub fn with_countries<I, S>(mut self, countries: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for country in countries {
            let code = country.as_ref().trim();
            let valid = matches!(code.len(), 2 | 3) && code.chars().all(|ch| ch.is_ascii_alphabetic());
            if !valid {
                return Err(ValidationError::InvalidCountryCode {
                    value: code.to_owned(),
                });
            }
            self.countries.push(code.to_ascii_uppercase());
        }
        Ok(self)
    }
}

impl CountryFilter for GeocodeRequest {
    fn countries(&self) -> &[String] {
        &self.countries
    }
}

/// Reverse geocoding input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverseRequest {
    pub coordinate: Coordinate,
    pub limit: usize,
}

impl ReverseRequest {
    pub fn new(coordinate: Coordinate, limit: usize) -> Result<Self, ValidationError> {
        if limit == 0 {
            return Err(ValidationError::ZeroLimit);
        }
        Ok(Self { coordinate, limit })
    }
}

/// Boxed future returned by [`Geocoder`] operations.
pub type GeocodeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Place>, GeocodingError>> + Send + 'a>>;

/// Normalized geocoding surface implemented by every provider service.
///
/// Implementations must be `Send + Sync`; the composition root shares them
/// behind `Arc<dyn Geocoder>`.
pub trait Geocoder: Send + Sync {
    fn provider(&self) -> ProviderId;

    /// Resolves free-form text into candidate places, best match first.
    fn geocode<'a>(
        &'a self,
        request: &'a GeocodeRequest,
        cancel: &'a CancellationToken,
    ) -> GeocodeFuture<'a>;

    /// Resolves a coordinate into nearby addresses or places.
    fn reverse_geocode<'a>(
        &'a self,
        request: &'a ReverseRequest,
        cancel: &'a CancellationToken,
    ) -> GeocodeFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_request_trims_query_and_rejects_blank() {
        let request = GeocodeRequest::new("  10 Downing St  ", 3).expect("valid");
        assert_eq!(request.query, "10 Downing St");

        let err = GeocodeRequest::new("   ", 3).expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyQuery);
    }

    #[test]
    fn geocode_request_normalizes_country_codes() {
        let request = GeocodeRequest::new("Paris", 1)
            .and_then(|request| request.with_countries(["fr", "Bel"]))
            .expect("valid");
        assert_eq!(request.countries, vec!["FR", "BEL"]);

        let err = GeocodeRequest::new("Paris", 1)
            .and_then(|request| request.with_countries(["France"]))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidCountryCode { .. }));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let point = Coordinate::new(51.5, -0.12).expect("valid");
        assert_eq!(
            ReverseRequest::new(point, 0).expect_err("must fail"),
            ValidationError::ZeroLimit
        );
    }
}
