//! Credential containers injected into provider services.
//!
//! | Type | Used by | Lifecycle |
//! |------|---------|-----------|
//! | [`KeyContainer`] | key-authenticated providers | set once, read many |
//! | [`TokenContainer`] | ArcGIS | refreshed on expiry, single-flight |

mod key;
mod token;

pub use key::KeyContainer;
pub use token::{Credentials, Token, TokenContainer, TokenRetrieval, EXPIRY_SAFETY_MARGIN, MAX_EXPIRES_IN};
