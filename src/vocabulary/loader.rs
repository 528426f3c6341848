use super::model::Vocabulary;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const EMBEDDED_VOCABULARY: &str = include_str!("../../data/oerschema.yml");

/// Errors raised while loading a vocabulary definition.
#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML vocabulary: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON vocabulary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported vocabulary extension '{extension}' (expected yml, yaml or json)")]
    UnsupportedExtension { extension: String },
}

impl Vocabulary {
    pub fn from_yaml_str(source: &str) -> Result<Self, VocabularyError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, VocabularyError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a vocabulary file, choosing the parser from its extension.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let read = || {
            fs::read_to_string(path).map_err(|source| VocabularyError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        let vocabulary = match extension.as_str() {
            "yml" | "yaml" => Self::from_yaml_str(&read()?)?,
            "json" => Self::from_json_str(&read()?)?,
            _ => return Err(VocabularyError::UnsupportedExtension { extension }),
        };

        tracing::info!(
            path = %path.display(),
            version = %vocabulary.version,
            classes = vocabulary.classes.len(),
            properties = vocabulary.properties.len(),
            "vocabulary loaded"
        );
        Ok(vocabulary)
    }

    /// The OER vocabulary bundled with the crate.
    pub fn embedded() -> Result<Self, VocabularyError> {
        Self::from_yaml_str(EMBEDDED_VOCABULARY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn yaml_accepts_single_string_or_list_references() {
        let vocab = Vocabulary::from_yaml_str(
            r#"
version: "2.0"
classes:
  Course:
    label: Course
    subClassOf: Resource
  Resource:
    subClassOf:
      - http://schema.org/Thing
properties:
  forCourse:
    domain: Resource
    range: [Course]
"#,
        )
        .expect("parse yaml");

        assert_eq!(vocab.version, "2.0");
        assert_eq!(vocab.classes["Course"].sub_class_of, vec!["Resource"]);
        assert!(vocab.classes["Course"].properties.is_empty());
        assert_eq!(vocab.properties["forCourse"].domain, vec!["Resource"]);
        let order: Vec<_> = vocab.classes.keys().cloned().collect();
        assert_eq!(order, vec!["Course", "Resource"]);
    }

    #[test]
    fn missing_sequences_default_to_empty() {
        let vocab =
            Vocabulary::from_json_str(r#"{"version":"1","classes":{"Bare":{}},"properties":{}}"#)
                .expect("parse json");
        let bare = &vocab.classes["Bare"];
        assert!(bare.sub_class_of.is_empty());
        assert!(bare.label.is_none());
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vocab.toml");
        fs::File::create(&path)
            .and_then(|mut f| f.write_all(b"version = 1"))
            .expect("write");
        let err = Vocabulary::load(&path).unwrap_err();
        assert!(matches!(err, VocabularyError::UnsupportedExtension { .. }));
    }

    #[test]
    fn embedded_vocabulary_contains_course() {
        let vocab = Vocabulary::embedded().expect("embedded vocabulary parses");
        let course = vocab.class("Course").expect("Course class");
        assert_eq!(course.sub_class_of, vec!["Resource", "http://schema.org/Course"]);
        assert_eq!(vocab.classes.keys().next().map(String::as_str), Some("Resource"));
        assert!(vocab.property("courseIdentifier").is_some());
    }
}
