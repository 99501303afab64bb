use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::collections::BTreeMap;
use std::fmt;

use super::TreeError;

/// With serde_json's `arbitrary_precision` feature, a number reaches the
/// visitor as a one-entry map holding its source text under this key.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// A JSON document as a read-only tree.
///
/// Numbers keep their source text so that coercion can decide exactly which
/// widths can represent them. Object key order carries no meaning. When the
/// builder sees the same key twice in one object, the first occurrence is
/// kept and later ones are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(String),
    String(String),
    Array(Vec<JsonValue>),
    Object(BTreeMap<String, JsonValue>),
}

impl JsonValue {
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_object() && !self.is_array()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, JsonValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Short description of the value's kind, used in mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::Number(_) => "a number",
            Self::String(_) => "a string",
            Self::Array(_) => "an array",
            Self::Object(_) => "an object",
        }
    }
}

/// Builds a [`JsonValue`] tree from JSON text.
pub fn parse_json(text: &str) -> Result<JsonValue, TreeError> {
    let value: JsonValue = serde_json::from_str(text)?;
    tracing::debug!(kind = value.kind_name(), "Built JSON value tree");
    Ok(value)
}

/// Same as [`parse_json`] for raw bytes.
pub fn parse_json_slice(bytes: &[u8]) -> Result<JsonValue, TreeError> {
    Ok(serde_json::from_slice(bytes)?)
}

// ============================================================================
// Deserialize
// ============================================================================

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(JsonValueVisitor)
    }
}

struct JsonValueVisitor;

impl<'de> Visitor<'de> for JsonValueVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(v.to_string()))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(v.to_string()))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonValue, E> {
        // Only reached from deserializers without number text; Display prints
        // the shortest text that reads back to the same f64.
        Ok(JsonValue::Number(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<JsonValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<JsonValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<JsonValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = BTreeMap::new();
        let Some(first) = map.next_key::<String>()? else {
            return Ok(JsonValue::Object(object));
        };
        if first == NUMBER_TOKEN {
            let text: String = map.next_value()?;
            return Ok(JsonValue::Number(text));
        }
        object.insert(first, map.next_value()?);
        while let Some((key, value)) = map.next_entry::<String, JsonValue>()? {
            object.entry(key).or_insert(value);
        }
        Ok(JsonValue::Object(object))
    }
}
