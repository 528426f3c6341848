//! Reference resolution against the vocabulary namespace.

/// Default namespace for local vocabulary terms.
pub const DEFAULT_BASE_URL: &str = "http://oerschema.org/";

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const SCHEMA_NS: &str = "http://schema.org/";

const ABSOLUTE_SCHEMES: [&str; 2] = ["http://", "https://"];

/// True when `reference` is an absolute `http(s)` URI.
pub fn is_absolute(reference: &str) -> bool {
    ABSOLUTE_SCHEMES
        .iter()
        .any(|scheme| reference.starts_with(scheme))
}

/// Resolves a term reference to a full URI.
///
/// Absolute references are returned unchanged; anything else is appended to
/// `base_uri` as is. No normalization happens, so `base_uri` must already end
/// with `/`.
pub fn resolve(reference: &str, base_uri: &str) -> String {
    if is_absolute(reference) {
        reference.to_string()
    } else {
        format!("{base_uri}{reference}")
    }
}

/// Compact form used by the prefixed syntaxes: `oer:Name` for local terms,
/// the URI itself for absolute ones.
pub fn compact(reference: &str) -> String {
    if is_absolute(reference) {
        reference.to_string()
    } else {
        format!("oer:{reference}")
    }
}
