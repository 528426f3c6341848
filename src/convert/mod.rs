//! Format converters.
//!
//! Each converter is a pure function of `(entity, options)`: no state is kept
//! between calls and the vocabulary is only read. Dispatch over formats is a
//! plain `match` on [`Format`], one function per (scope, format) pair.

mod json_schema;
mod jsonld;
mod microdata;
mod ntriples;
mod raw;
mod rdfa;
mod rdfxml;
mod turtle;
mod type_map;

pub use json_schema::{class_to_json_schema, property_to_json_schema};
pub use jsonld::{class_to_jsonld, property_to_jsonld, vocabulary_to_jsonld};
pub use microdata::{class_to_microdata, property_to_microdata};
pub use ntriples::{class_to_ntriples, property_to_ntriples, vocabulary_to_ntriples};
pub use raw::{class_to_json, property_to_json, vocabulary_to_json};
pub use rdfa::{class_to_rdfa, property_to_rdfa};
pub use rdfxml::{class_to_xml, property_to_xml, vocabulary_to_xml};
pub use turtle::{class_to_turtle, property_to_turtle, vocabulary_to_turtle};
pub use type_map::{JsonPrimitive, JsonType, json_type_for_range};

use crate::negotiate::{Format, Scope, select_converter};
use crate::uri::DEFAULT_BASE_URL;
use crate::vocabulary::{TermKind, Vocabulary, VocabularyClass, VocabularyProperty};
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;

/// Options shared by every converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Namespace for local references; must end with `/`.
    pub base_url: String,
    /// Two-space indentation for the JSON formats.
    pub pretty: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pretty: false,
        }
    }
}

impl ConvertOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{kind} '{name}' not found")]
    EntityNotFound { kind: TermKind, name: String },

    #[error("failed to serialize JSON output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConvertError {
    pub fn not_found(kind: TermKind, name: impl Into<String>) -> Self {
        ConvertError::EntityNotFound {
            kind,
            name: name.into(),
        }
    }
}

pub type ConvertResult = Result<String, ConvertError>;

pub(crate) fn to_json<T: Serialize>(value: &T, pretty: bool) -> ConvertResult {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Serializes the whole vocabulary.
///
/// Formats with no whole-vocabulary rendition (JSON Schema, RDFa, Microdata)
/// fall back to the raw JSON dump.
pub fn convert_whole_vocabulary(
    vocab: &Vocabulary,
    format: Format,
    options: &ConvertOptions,
) -> ConvertResult {
    let selection = select_converter(Scope::Vocabulary, format);
    match selection.format {
        Format::JsonLd => vocabulary_to_jsonld(vocab, options),
        Format::RdfXml => Ok(vocabulary_to_xml(vocab, options)),
        Format::Turtle => Ok(vocabulary_to_turtle(vocab, options)),
        Format::NTriples => Ok(vocabulary_to_ntriples(vocab, options)),
        _ => vocabulary_to_json(vocab, options),
    }
}

/// Serializes one class. `vocab` is consulted only by JSON Schema, to map
/// the class's properties to their ranges; without it the schema has no
/// `properties` entries.
pub fn convert_class(
    name: &str,
    class: &VocabularyClass,
    format: Format,
    options: &ConvertOptions,
    vocab: Option<&Vocabulary>,
) -> ConvertResult {
    match format {
        Format::Json => class_to_json(name, class, options),
        Format::JsonLd => class_to_jsonld(name, class, options),
        Format::JsonSchema => class_to_json_schema(name, class, options, vocab),
        Format::RdfXml => Ok(class_to_xml(name, class, options)),
        Format::Turtle => Ok(class_to_turtle(name, class, options)),
        Format::NTriples => Ok(class_to_ntriples(name, class, options)),
        Format::Rdfa => Ok(class_to_rdfa(name, class, options)),
        Format::Microdata => Ok(class_to_microdata(name, class, options)),
    }
}

/// Serializes one property.
pub fn convert_property(
    name: &str,
    prop: &VocabularyProperty,
    format: Format,
    options: &ConvertOptions,
) -> ConvertResult {
    match format {
        Format::Json => property_to_json(name, prop, options),
        Format::JsonLd => property_to_jsonld(name, prop, options),
        Format::JsonSchema => property_to_json_schema(name, prop, options),
        Format::RdfXml => Ok(property_to_xml(name, prop, options)),
        Format::Turtle => Ok(property_to_turtle(name, prop, options)),
        Format::NTriples => Ok(property_to_ntriples(name, prop, options)),
        Format::Rdfa => Ok(property_to_rdfa(name, prop, options)),
        Format::Microdata => Ok(property_to_microdata(name, prop, options)),
    }
}

/// What a request asks to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Vocabulary,
    Class(&'a str),
    Property(&'a str),
}

impl Target<'_> {
    pub fn scope(&self) -> Scope {
        match self {
            Target::Vocabulary => Scope::Vocabulary,
            Target::Class(_) => Scope::Class,
            Target::Property(_) => Scope::Property,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Target::Vocabulary => None,
            Target::Class(name) | Target::Property(name) => Some(name),
        }
    }
}

/// A converted document with the content type it must be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub format: Format,
    pub content_type: &'static str,
    pub body: String,
}

/// Looks the target up in the vocabulary and converts it.
///
/// Unknown names yield [`ConvertError::EntityNotFound`]; nothing is emitted
/// for them.
pub fn render(
    vocab: &Vocabulary,
    target: Target<'_>,
    requested: Format,
    options: &ConvertOptions,
) -> Result<Rendered, ConvertError> {
    let selection = select_converter(target.scope(), requested);
    let _span = crate::logging::conversion_span(target.scope().as_str(), selection.format).entered();
    let started = Instant::now();

    let body = match target {
        Target::Vocabulary => convert_whole_vocabulary(vocab, selection.format, options)?,
        Target::Class(name) => {
            let class = vocab
                .class(name)
                .ok_or_else(|| ConvertError::not_found(TermKind::Class, name))?;
            convert_class(name, class, selection.format, options, Some(vocab))?
        }
        Target::Property(name) => {
            let prop = vocab
                .property(name)
                .ok_or_else(|| ConvertError::not_found(TermKind::Property, name))?;
            convert_property(name, prop, selection.format, options)?
        }
    };

    let elapsed = started.elapsed();
    crate::metrics::METRICS.record_conversion(target.scope(), selection.format, elapsed);
    crate::log_slow_operation!(
        elapsed,
        50,
        scope = target.scope().as_str(),
        format = %selection.format,
        bytes = body.len(),
        "conversion finished"
    );

    Ok(Rendered {
        format: selection.format,
        content_type: selection.content_type,
        body,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_reports_unknown_entities() {
        let vocab = fixtures::vocabulary();
        let err = render(
            &vocab,
            Target::Class("Nope"),
            Format::Turtle,
            &ConvertOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::EntityNotFound { kind: TermKind::Class, ref name } if name == "Nope"
        ));
        assert_eq!(err.to_string(), "class 'Nope' not found");
    }

    #[test]
    fn render_applies_scope_fallback() {
        let vocab = fixtures::vocabulary();
        let rendered = render(
            &vocab,
            Target::Vocabulary,
            Format::Rdfa,
            &ConvertOptions::default(),
        )
        .expect("render");
        assert_eq!(rendered.format, Format::Json);
        assert_eq!(rendered.content_type, "application/json");
        assert!(rendered.body.starts_with("{\"version\":\"1.0.0\""));
    }

    #[test]
    fn every_entity_format_is_deterministic() {
        let vocab = fixtures::vocabulary();
        let options = ConvertOptions::default().pretty(true);
        for format in Format::all() {
            let first = render(&vocab, Target::Property("courseIdentifier"), format, &options)
                .expect("render");
            let second = render(&vocab, Target::Property("courseIdentifier"), format, &options)
                .expect("render");
            assert_eq!(first, second, "format {format}");
            assert_eq!(first.content_type, format.content_type());
        }
    }
}
