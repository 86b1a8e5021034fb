//! # Geokit Core
//!
//! Typed clients for commercial geocoding services behind one error model.
//!
//! ## Overview
//!
//! - **Provider services** for ArcGIS, Bing, Google, HERE, MapBox, MapQuest,
//!   Positionstack and Radar, each with typed parameters and response models
//! - **Shared executor** that performs a GET, decodes JSON and translates
//!   every failure into [`GeocodingError`]
//! - **Credential containers**: a write-once API key holder and a token holder
//!   with single-flight OAuth refresh
//! - **Converters** for polymorphic objects, fixed-arity coordinate arrays and
//!   enums with irregular wire strings
//! - **A normalized [`Geocoder`] trait** returning provider-neutral [`Place`]s
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`convert`] | Polymorphic, array and enum converters |
//! | [`credentials`] | [`KeyContainer`] and [`TokenContainer`] |
//! | [`domain`] | Coordinates, bounding boxes and places |
//! | [`error`] | Validation, provider and top-level errors |
//! | [`executor`] | [`ClientExecutor`] call primitive |
//! | [`geocoder`] | Provider-neutral requests and the [`Geocoder`] trait |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`provider`] | [`ProviderId`] |
//! | [`providers`] | One service per provider |
//! | [`query`] | Query-string assembly and parameter capabilities |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use geokit_core::providers::GoogleService;
//! use geokit_core::{ClientExecutor, GeocodeRequest, Geocoder, KeyContainer, ProviderId, ReqwestHttpClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = ClientExecutor::new(ProviderId::Google, Arc::new(ReqwestHttpClient::new()));
//!     let keys = Arc::new(KeyContainer::with_key(ProviderId::Google, "your-key"));
//!     let google = GoogleService::new(executor, keys);
//!
//!     let request = GeocodeRequest::new("1600 Amphitheatre Pkwy", 1)?;
//!     for place in Geocoder::geocode(&google, &request, &CancellationToken::new()).await? {
//!         println!("{} -> {}", place.label, place.coordinate);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use geokit_core::{FailureKind, GeocodingError};
//!
//! fn describe(error: &GeocodingError) -> &'static str {
//!     match error {
//!         GeocodingError::InvalidArgument(_) => "fix the input",
//!         GeocodingError::Cancelled => "caller gave up",
//!         GeocodingError::Provider(error) => match error.kind() {
//!             FailureKind::Credential => "check the api key",
//!             FailureKind::Transport => "network trouble",
//!             FailureKind::Status | FailureKind::Parse => "provider problem",
//!         },
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Keys, secrets and tokens are redacted from `Debug` output
//! - Logged URLs have their query string stripped

pub mod convert;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod executor;
pub mod geocoder;
pub mod http_client;
pub mod provider;
pub mod providers;
pub mod query;

// Credentials
pub use credentials::{Credentials, KeyContainer, Token, TokenContainer, TokenRetrieval};

// Domain models
pub use domain::{BoundingBox, Coordinate, Place};

// Error types
pub use error::{FailureKind, GeocodingError, ProviderError, ValidationError};

// Executor
pub use executor::{CallResult, ClientExecutor};

// Normalized surface
pub use geocoder::{GeocodeFuture, GeocodeRequest, Geocoder, ReverseRequest};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient, ScriptedHttpClient,
};

// Provider identifiers
pub use provider::ProviderId;
