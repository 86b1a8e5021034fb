//! Typed clients, one module per geocoding provider.
//!
//! Every service takes a [`ClientExecutor`](crate::executor::ClientExecutor)
//! bound to its provider plus the credential holder it needs, exposes the
//! provider's own endpoints with typed parameters and response models, and
//! implements [`Geocoder`](crate::geocoder::Geocoder) on top of them.

pub mod arcgis;
pub mod bing;
pub mod google;
pub mod here;
pub mod mapbox;
pub mod mapquest;
pub mod positionstack;
pub mod radar;

pub use arcgis::ArcGisService;
pub use bing::BingService;
pub use google::GoogleService;
pub use here::HereService;
pub use mapbox::MapboxService;
pub use mapquest::MapQuestService;
pub use positionstack::PositionstackService;
pub use radar::RadarService;
