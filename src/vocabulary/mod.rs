//! In-memory vocabulary model and its YAML/JSON loader.
//!
//! The vocabulary is loaded once at startup and then shared behind an `Arc`;
//! nothing in the crate mutates it afterwards.

mod loader;
mod model;

pub use loader::VocabularyError;
pub(crate) use model::non_empty;
pub use model::{
    DanglingReference, TermKind, TermSummary, Vocabulary, VocabularyClass, VocabularyProperty,
};
