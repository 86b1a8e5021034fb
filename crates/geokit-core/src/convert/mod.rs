//! Response converters for shapes serde's derives cannot express directly.
//!
//! | Module | Handles |
//! |--------|---------|
//! | [`polymorphic`] | objects typed by which keys are present |
//! | [`arrays`] | fixed-length coordinate and bounding-box arrays |
//! | [`enums`] | enums with irregular wire strings |

pub mod arrays;
pub mod enums;
pub mod polymorphic;

pub(crate) use enums::wire_enum;
pub use enums::{decode_wire, WireEnum};
pub use polymorphic::{deserialize_discriminated, into_shape, KeyDiscriminated, KeyRules};
