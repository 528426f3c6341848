use super::type_map::{JsonPrimitive, json_type_for_range};
use super::{ConvertOptions, ConvertResult, to_json};
use crate::vocabulary::{Vocabulary, VocabularyClass, VocabularyProperty, non_empty};
use indexmap::IndexMap;
use serde::Serialize;

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Serialize)]
struct PropertySchema<'a> {
    #[serde(rename = "type")]
    primitive: JsonPrimitive,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

impl<'a> PropertySchema<'a> {
    fn new(prop: &'a VocabularyProperty) -> Self {
        let mapped = json_type_for_range(&prop.range);
        Self {
            primitive: mapped.primitive,
            description: non_empty(&prop.comment).unwrap_or(""),
            format: mapped.format,
        }
    }
}

#[derive(Serialize)]
struct ObjectSchema<'a> {
    #[serde(rename = "$schema")]
    schema: &'static str,
    title: &'a str,
    description: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    properties: IndexMap<&'a str, PropertySchema<'a>>,
}

impl<'a> ObjectSchema<'a> {
    fn new(title: &'a str, comment: &'a Option<String>) -> Self {
        Self {
            schema: DRAFT_07,
            title,
            description: non_empty(comment).unwrap_or(""),
            kind: "object",
            properties: IndexMap::new(),
        }
    }
}

/// Draft-07 schema for instances of a class.
///
/// Each listed property is looked up in `vocab`; names without an entry, or
/// every name when no vocabulary is given, are left out.
pub fn class_to_json_schema(
    name: &str,
    class: &VocabularyClass,
    options: &ConvertOptions,
    vocab: Option<&Vocabulary>,
) -> ConvertResult {
    let mut schema = ObjectSchema::new(name, &class.comment);
    if let Some(vocab) = vocab {
        for prop_name in &class.properties {
            match vocab.property(prop_name) {
                Some(prop) => {
                    schema
                        .properties
                        .insert(prop_name.as_str(), PropertySchema::new(prop));
                }
                None => tracing::trace!(class = name, property = %prop_name, "property not in vocabulary"),
            }
        }
    }
    to_json(&schema, options.pretty)
}

/// Draft-07 schema wrapping a single property keyed by its own name.
pub fn property_to_json_schema(
    name: &str,
    prop: &VocabularyProperty,
    options: &ConvertOptions,
) -> ConvertResult {
    let mut schema = ObjectSchema::new(name, &prop.comment);
    schema.properties.insert(name, PropertySchema::new(prop));
    to_json(&schema, options.pretty)
}
