//! Parse-back of generated RDF documents.
//!
//! Every Turtle, N-Triples and RDF/XML document the generator writes can be
//! loaded into an in-memory `oxigraph` store; a syntax error names the file.

use crate::negotiate::Format;
use oxigraph::io::RdfFormat;
use oxigraph::store::Store;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("{format} output is not an RDF syntax")]
    NotRdf { format: Format },

    #[error("failed to open an in-memory RDF store: {0}")]
    Store(String),

    #[error("{location} does not parse as {format}: {message}")]
    Parse {
        location: String,
        format: Format,
        message: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn rdf_format(format: Format) -> Option<RdfFormat> {
    match format {
        Format::Turtle => Some(RdfFormat::Turtle),
        Format::NTriples => Some(RdfFormat::NTriples),
        Format::RdfXml => Some(RdfFormat::RdfXml),
        _ => None,
    }
}

/// Formats whose output is parsed back.
pub fn is_verifiable(format: Format) -> bool {
    rdf_format(format).is_some()
}

fn load(document: &str, format: Format, location: &str) -> Result<Store, VerifyError> {
    let rdf = rdf_format(format).ok_or(VerifyError::NotRdf { format })?;
    let store = Store::new().map_err(|err| VerifyError::Store(err.to_string()))?;
    store
        .load_from_reader(rdf, document.as_bytes())
        .map_err(|err| VerifyError::Parse {
            location: location.to_string(),
            format,
            message: err.to_string(),
        })?;
    Ok(store)
}

/// Parses `document` and returns the number of triples it holds.
pub fn verify_document(document: &str, format: Format) -> Result<usize, VerifyError> {
    let store = load(document, format, "document")?;
    store.len().map_err(|err| VerifyError::Store(err.to_string()))
}

/// Reads and parses a generated file.
pub fn verify_file(path: &Path, format: Format) -> Result<usize, VerifyError> {
    let document = std::fs::read_to_string(path).map_err(|source| VerifyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let store = load(&document, format, &path.display().to_string())?;
    store.len().map_err(|err| VerifyError::Store(err.to_string()))
}

/// The triples of `document` in N-Triples notation, sorted.
///
/// Equal sets mean two serializations describe the same graph.
pub fn triple_set(document: &str, format: Format) -> Result<BTreeSet<String>, VerifyError> {
    let store = load(document, format, "document")?;
    store
        .iter()
        .map(|quad| {
            quad.map(|quad| quad.to_string())
                .map_err(|err| VerifyError::Store(err.to_string()))
        })
        .collect()
}
