//! # Domain Models
//!
//! Provider-neutral types shared by every service.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Coordinate`] | Latitude/longitude pair in degrees |
//! | [`BoundingBox`] | South/west/north/east extent |
//! | [`Place`] | Normalized geocoding result |

mod coordinate;
mod place;

pub use coordinate::{BoundingBox, Coordinate};
pub use place::Place;
