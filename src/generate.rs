//! Static pre-rendering of the vocabulary to disk.
//!
//! Layout under `<out>/schema/`:
//!
//! ```text
//! schema.{json,jsonld,rdf,ttl,nt}
//! class/index.json           property/index.json
//! class/<Name>.<ext>         class/<Name>/index.<ext>
//! property/<name>.<ext>      property/<name>/index.<ext>
//! ```

use crate::convert::{ConvertOptions, convert_class, convert_property, convert_whole_vocabulary};
use crate::negotiate::{Format, Scope, is_supported};
use crate::verify::{is_verifiable, verify_file};
use crate::vocabulary::{TermKind, Vocabulary, VocabularyClass};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub out_dir: PathBuf,
    pub convert: ConvertOptions,
    /// Parse every RDF file back after writing it
    pub verify: bool,
}

impl GenerateOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            convert: ConvertOptions::default().pretty(true),
            verify: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub files_written: usize,
    pub classes: usize,
    pub properties: usize,
    /// RDF documents parsed back successfully
    pub verified: usize,
    pub triples: usize,
}

#[derive(Serialize)]
struct EnrichedClass<'a> {
    #[serde(rename = "className")]
    name: &'a str,
    #[serde(flatten)]
    class: &'a VocabularyClass,
    #[serde(rename = "domainProperties")]
    domain_properties: Vec<&'a str>,
}

struct Writer<'a> {
    root: PathBuf,
    options: &'a GenerateOptions,
    report: GenerationReport,
}

impl Writer<'_> {
    fn write(&mut self, relative: &Path, format: Format, body: &str) -> Result<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
        self.report.files_written += 1;
        debug!(path = %path.display(), bytes = body.len(), "wrote file");

        if self.options.verify && is_verifiable(format) {
            self.report.triples += verify_file(&path, format)?;
            self.report.verified += 1;
        }
        Ok(())
    }

    /// Writes `<kind>/<name>.<ext>` and its `<kind>/<name>/index.<ext>` mirror.
    fn write_entity(&mut self, kind: TermKind, name: &str, format: Format, body: &str) -> Result<()> {
        let ext = format.extension();
        let dir = Path::new(kind.as_str());
        self.write(&dir.join(format!("{name}.{ext}")), format, body)?;
        self.write(&dir.join(name).join(format!("index.{ext}")), format, body)
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.options.convert.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        Ok(json?)
    }
}

const VOCABULARY_FORMATS: [Format; 5] = [
    Format::Json,
    Format::JsonLd,
    Format::RdfXml,
    Format::Turtle,
    Format::NTriples,
];

/// Renders every term in every supported format below `options.out_dir`.
pub fn generate_site(vocab: &Vocabulary, options: &GenerateOptions) -> Result<GenerationReport> {
    let root = options.out_dir.join("schema");
    let _span = crate::logging::generation_span(&root).entered();
    let mut writer = Writer {
        root,
        options,
        report: GenerationReport::default(),
    };
    let convert = &options.convert;

    for format in VOCABULARY_FORMATS {
        let body = convert_whole_vocabulary(vocab, format, convert)
            .with_context(|| format!("failed to convert the vocabulary to {format}"))?;
        writer.write(Path::new(&format!("schema.{}", format.extension())), format, &body)?;
    }

    let classes = writer.to_json(&vocab.summaries(TermKind::Class))?;
    writer.write(Path::new("class/index.json"), Format::Json, &classes)?;
    let properties = writer.to_json(&vocab.summaries(TermKind::Property))?;
    writer.write(Path::new("property/index.json"), Format::Json, &properties)?;

    for (name, class) in &vocab.classes {
        for format in Format::all().filter(|f| is_supported(Scope::Class, *f)) {
            let body = if format == Format::Json {
                writer.to_json(&EnrichedClass {
                    name,
                    class,
                    domain_properties: vocab.properties_for_domain(name),
                })?
            } else {
                convert_class(name, class, format, convert, Some(vocab))
                    .with_context(|| format!("failed to convert class '{name}' to {format}"))?
            };
            writer.write_entity(TermKind::Class, name, format, &body)?;
        }
        writer.report.classes += 1;
    }

    for (name, prop) in &vocab.properties {
        for format in Format::all().filter(|f| is_supported(Scope::Property, *f)) {
            let body = convert_property(name, prop, format, convert)
                .with_context(|| format!("failed to convert property '{name}' to {format}"))?;
            writer.write_entity(TermKind::Property, name, format, &body)?;
        }
        writer.report.properties += 1;
    }

    let report = writer.report;
    info!(
        files = report.files_written,
        classes = report.classes,
        properties = report.properties,
        verified = report.verified,
        "static generation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::fixtures;

    #[test]
    fn writes_every_entity_in_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let report = generate_site(&fixtures::vocabulary(), &GenerateOptions::new(dir.path())).unwrap();

        // 5 vocabulary files, 2 indexes, 3 terms x 8 formats x 2 paths
        assert_eq!(report.files_written, 5 + 2 + 3 * 8 * 2);
        assert_eq!((report.classes, report.properties), (2, 1));
        assert_eq!(report.verified, 0);

        let schema = dir.path().join("schema");
        assert!(schema.join("schema.nt").is_file());
        assert!(schema.join("class/Course.microdata.html").is_file());
        assert!(schema.join("class/Course/index.schema.json").is_file());
        assert!(schema.join("property/courseIdentifier/index.ttl").is_file());
    }

    #[test]
    fn class_json_lists_domain_properties() {
        let dir = tempfile::tempdir().unwrap();
        generate_site(&fixtures::vocabulary(), &GenerateOptions::new(dir.path())).unwrap();

        let body = fs::read_to_string(dir.path().join("schema/class/Course.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["className"], "Course");
        assert_eq!(json["domainProperties"], serde_json::json!(["courseIdentifier"]));
    }

    #[test]
    fn verification_counts_rdf_documents() {
        let dir = tempfile::tempdir().unwrap();
        let options = GenerateOptions {
            verify: true,
            ..GenerateOptions::new(dir.path())
        };
        let report = generate_site(&fixtures::vocabulary(), &options).unwrap();
        // 3 vocabulary documents, 3 terms x 3 formats x 2 paths
        assert_eq!(report.verified, 3 + 3 * 3 * 2);
        assert!(report.triples > 0);
    }
}
