//! Enum values whose wire strings differ from the variant names.
//!
//! [`wire_enum!`](crate::convert::wire_enum) declares an enum together with a
//! constant `(variant, wire)` table and serde impls driven by it. A variant
//! without an explicit string uses its own name. Decoding policy is chosen per
//! enum:
//!
//! - strict (default): an unknown string is a decode error;
//! - `fallback = Variant`: an unknown string maps to `Variant`. Only the
//!   not-found case falls back, a non-string token is still an error.

/// Bidirectional mapping between an enum and its wire strings.
pub trait WireEnum: Sized + Copy + PartialEq + 'static {
    const TABLE: &'static [(Self, &'static str)];

    /// Variant used for unknown strings, if the enum opts into one.
    const FALLBACK: Option<Self>;

    fn as_wire(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(variant, _)| *variant == self)
            .map_or("", |(_, wire)| *wire)
    }

    fn from_wire(value: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, wire)| *wire == value)
            .map(|(variant, _)| *variant)
    }
}

/// Decodes a wire string according to the enum's policy.
pub fn decode_wire<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: WireEnum,
{
    use serde::Deserialize;

    let raw = String::deserialize(deserializer)?;
    match (T::from_wire(&raw), T::FALLBACK) {
        (Some(variant), _) => Ok(variant),
        (None, Some(fallback)) => Ok(fallback),
        (None, None) => Err(serde::de::Error::custom(format!(
            "unknown value '{raw}', expected one of: {}",
            T::TABLE
                .iter()
                .map(|(_, wire)| *wire)
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

macro_rules! wire_enum {
    (@wire $variant:ident) => { stringify!($variant) };
    (@wire $variant:ident $wire:literal) => { $wire };
    (@fallback) => { None };
    (@fallback $fallback:ident) => { Some(Self::$fallback) };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident $([fallback = $fallback:ident])? {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $wire:literal)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $crate::convert::WireEnum for $name {
            const TABLE: &'static [(Self, &'static str)] = &[
                $((Self::$variant, $crate::convert::wire_enum!(@wire $variant $($wire)?)),)+
            ];
            const FALLBACK: Option<Self> = $crate::convert::wire_enum!(@fallback $($fallback)?);
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::convert::WireEnum::as_wire(*self))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::convert::WireEnum::as_wire(*self))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                $crate::convert::decode_wire(deserializer)
            }
        }
    };
}

pub(crate) use wire_enum;
