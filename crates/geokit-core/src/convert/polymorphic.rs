//! Decoding for objects whose concrete type is implied by the keys present.
//!
//! The object is materialized into a [`serde_json::Value`] first, so the
//! decision can look at every key and the same payload can then be mapped
//! into the chosen struct with its regular field renames.

use serde::de::{self, DeserializeOwned, Unexpected};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Ordered key-presence rules ending in a fallback.
///
/// The first rule whose key is present on the object wins; when none match,
/// the fallback is chosen, so resolution never fails.
#[derive(Debug, Clone, Copy)]
pub struct KeyRules<K: Copy + 'static> {
    rules: &'static [(&'static str, K)],
    fallback: K,
}

impl<K: Copy + 'static> KeyRules<K> {
    pub const fn new(rules: &'static [(&'static str, K)], fallback: K) -> Self {
        Self { rules, fallback }
    }

    pub fn resolve(&self, object: &Map<String, Value>) -> K {
        self.rules
            .iter()
            .find(|(key, _)| object.contains_key(*key))
            .map_or(self.fallback, |(_, kind)| *kind)
    }
}

/// A type that picks one of several shapes from a materialized object.
pub trait KeyDiscriminated: Sized {
    type Kind: Copy + 'static;

    const RULES: KeyRules<Self::Kind>;

    /// Maps the object into the concrete shape chosen for `kind`.
    fn from_kind(kind: Self::Kind, object: Value) -> Result<Self, serde_json::Error>;
}

/// Deserializes a [`KeyDiscriminated`] type.
///
/// Call it from the type's `Deserialize` impl. `null` should be modelled by
/// wrapping the field in `Option`, which never reaches this function.
pub fn deserialize_discriminated<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: de::Deserializer<'de>,
    T: KeyDiscriminated,
{
    let object = expect_object(Value::deserialize(deserializer)?)?;
    let kind = T::RULES.resolve(&object);
    T::from_kind(kind, Value::Object(object)).map_err(de::Error::custom)
}

/// Maps a materialized object into `T` using its derived field mapping.
pub fn into_shape<T: DeserializeOwned>(object: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(object)
}

fn expect_object<E: de::Error>(value: Value) -> Result<Map<String, Value>, E> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(E::invalid_type(unexpected(&other), &"a JSON object")),
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(flag) => Unexpected::Bool(*flag),
        Value::Number(number) => number
            .as_f64()
            .map_or(Unexpected::Other("number"), Unexpected::Float),
        Value::String(text) => Unexpected::Str(text),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
