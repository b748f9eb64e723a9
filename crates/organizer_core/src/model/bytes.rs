//! Base64 (de)serialization for optional opaque byte payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::{Error, Unexpected, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt::Formatter;

pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match data {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<u8>>, D::Error> {
    struct Base64Visitor;

    impl<'de> Visitor<'de> for Base64Visitor {
        type Value = Option<Vec<u8>>;

        fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a base64 encoded string")
        }

        fn visit_str<E: Error>(self, value: &str) -> Result<Self::Value, E> {
            STANDARD
                .decode(value)
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
        }

        fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_str(self)
        }
    }

    deserializer.deserialize_option(Base64Visitor)
}
