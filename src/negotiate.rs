//! Content negotiation: maps a `format=` token or an `Accept` header to an
//! output [`Format`] and its response content type.
//!
//! Negotiation never fails. Anything unrecognized falls back to raw JSON so a
//! client is never blocked on an odd `Accept` value.

use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Output format of a conversion.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Format {
    /// Raw field dump of the vocabulary model.
    #[default]
    #[strum(to_string = "json", serialize = "application/json")]
    Json,
    #[strum(to_string = "jsonld", serialize = "application/ld+json")]
    JsonLd,
    #[strum(to_string = "schema", serialize = "application/schema+json")]
    JsonSchema,
    #[strum(to_string = "xml", serialize = "application/xml", serialize = "application/rdf+xml")]
    RdfXml,
    #[strum(to_string = "turtle", serialize = "text/turtle")]
    Turtle,
    #[strum(to_string = "ntriples", serialize = "application/n-triples")]
    NTriples,
    #[strum(to_string = "rdfa", serialize = "text/html+rdfa")]
    Rdfa,
    #[strum(to_string = "microdata", serialize = "text/html+microdata")]
    Microdata,
}

impl Format {
    /// Parses a format token or media type, falling back to [`Format::Json`].
    pub fn from_token(token: &str) -> Self {
        Self::parse(token).unwrap_or_default()
    }

    /// Strict parse: `None` for anything not in the dispatch table.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let media = token.split(';').next().unwrap_or(token).trim();
        Format::from_str(media).ok()
    }

    /// Picks the best recognized media type of an `Accept` header.
    ///
    /// Entries are ranked by their `q` parameter; ties keep header order.
    /// Returns `None` when no entry names a known format.
    pub fn from_accept(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, usize, Format)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut parts = entry.split(';');
                let format = Format::from_str(parts.next()?.trim()).ok()?;
                let quality = parts
                    .filter_map(|param| param.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then_some((quality, position, format))
            })
            .collect();

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.first().map(|(_, _, format)| *format)
    }

    /// Resolves the requested format: an explicit `format=` token wins over
    /// the `Accept` header, and both fall back to JSON.
    pub fn negotiate(query_token: Option<&str>, accept: Option<&str>) -> Self {
        if let Some(token) = query_token.filter(|t| !t.trim().is_empty()) {
            return Self::from_token(token);
        }
        accept.and_then(Self::from_accept).unwrap_or_default()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::JsonLd => "application/ld+json",
            Format::JsonSchema => "application/schema+json",
            Format::RdfXml => "application/xml",
            Format::Turtle => "text/turtle",
            Format::NTriples => "application/n-triples",
            Format::Rdfa => "text/html+rdfa",
            Format::Microdata => "text/html+microdata",
        }
    }

    /// File extension used by the static generator.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::JsonLd => "jsonld",
            Format::JsonSchema => "schema.json",
            Format::RdfXml => "rdf",
            Format::Turtle => "ttl",
            Format::NTriples => "nt",
            Format::Rdfa => "rdfa.html",
            Format::Microdata => "microdata.html",
        }
    }

    pub fn all() -> impl Iterator<Item = Format> {
        Format::iter()
    }
}

/// Content type of a format, as returned to HTTP clients.
pub fn content_type_for(format: Format) -> &'static str {
    format.content_type()
}

/// Granularity of a conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Vocabulary,
    Class,
    Property,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Vocabulary => "vocabulary",
            Scope::Class => "class",
            Scope::Property => "property",
        }
    }
}

/// Outcome of dispatch: the converter that will run and the content type it
/// answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub scope: Scope,
    pub format: Format,
    pub content_type: &'static str,
}

/// Whether a converter exists for the (scope, format) pair.
pub fn is_supported(scope: Scope, format: Format) -> bool {
    match scope {
        Scope::Vocabulary => !matches!(
            format,
            Format::JsonSchema | Format::Rdfa | Format::Microdata
        ),
        Scope::Class | Scope::Property => true,
    }
}

/// Selects the converter for a request, falling back to raw JSON for
/// combinations that have none.
pub fn select_converter(scope: Scope, requested: Format) -> Selection {
    let format = if is_supported(scope, requested) {
        requested
    } else {
        tracing::debug!(
            scope = scope.as_str(),
            requested = %requested,
            "format not available for scope, falling back to json"
        );
        Format::Json
    };
    Selection {
        scope,
        format,
        content_type: format.content_type(),
    }
}
