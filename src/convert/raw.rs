//! Raw JSON: the model's own fields, as the API served before any RDF
//! format was negotiated.

use super::{ConvertOptions, ConvertResult, to_json};
use crate::vocabulary::{Vocabulary, VocabularyClass, VocabularyProperty};
use serde::Serialize;

#[derive(Serialize)]
struct NamedClass<'a> {
    #[serde(rename = "className")]
    name: &'a str,
    #[serde(flatten)]
    class: &'a VocabularyClass,
}

#[derive(Serialize)]
struct NamedProperty<'a> {
    #[serde(rename = "propertyName")]
    name: &'a str,
    #[serde(flatten)]
    prop: &'a VocabularyProperty,
}

pub fn vocabulary_to_json(vocab: &Vocabulary, options: &ConvertOptions) -> ConvertResult {
    to_json(vocab, options.pretty)
}

pub fn class_to_json(name: &str, class: &VocabularyClass, options: &ConvertOptions) -> ConvertResult {
    to_json(&NamedClass { name, class }, options.pretty)
}

pub fn property_to_json(
    name: &str,
    prop: &VocabularyProperty,
    options: &ConvertOptions,
) -> ConvertResult {
    to_json(&NamedProperty { name, prop }, options.pretty)
}
