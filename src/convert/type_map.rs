//! Mapping from vocabulary range types to JSON Schema primitives.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JsonPrimitive {
    String,
    Number,
    Integer,
    Boolean,
}

/// JSON Schema `type` plus optional `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JsonType {
    #[serde(rename = "type")]
    pub primitive: JsonPrimitive,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
}

impl JsonType {
    const fn plain(primitive: JsonPrimitive) -> Self {
        Self {
            primitive,
            format: None,
        }
    }

    const fn formatted(primitive: JsonPrimitive, format: &'static str) -> Self {
        Self {
            primitive,
            format: Some(format),
        }
    }
}

impl Default for JsonType {
    fn default() -> Self {
        Self::plain(JsonPrimitive::String)
    }
}

const TYPE_TABLE: [(&str, JsonType); 6] = [
    ("Text", JsonType::plain(JsonPrimitive::String)),
    ("URL", JsonType::formatted(JsonPrimitive::String, "uri")),
    ("DateTime", JsonType::formatted(JsonPrimitive::String, "date-time")),
    ("Number", JsonType::plain(JsonPrimitive::Number)),
    ("Integer", JsonType::plain(JsonPrimitive::Integer)),
    ("Boolean", JsonType::plain(JsonPrimitive::Boolean)),
];

fn lookup(range_type: &str) -> Option<JsonType> {
    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == range_type)
        .map(|(_, json_type)| *json_type)
}

/// First entry of `range` with a table mapping wins; anything else,
/// including an empty range, is a plain string.
pub fn json_type_for_range(range: &[String]) -> JsonType {
    range
        .iter()
        .find_map(|r| lookup(r))
        .unwrap_or_default()
}
