use super::ConvertOptions;
use crate::escape::escape_ntriples;
use crate::uri::{RDF_NS, RDFS_NS, resolve};
use crate::vocabulary::{Vocabulary, VocabularyClass, VocabularyProperty, non_empty};
use std::fmt::Write;

struct Triples<'a> {
    out: String,
    base_url: &'a str,
    subject: String,
}

impl<'a> Triples<'a> {
    fn new(out: String, name: &str, base_url: &'a str) -> Self {
        Self {
            out,
            base_url,
            subject: resolve(name, base_url),
        }
    }

    fn iri(&mut self, predicate: &str, object: &str) {
        let _ = writeln!(self.out, "<{}> <{predicate}> <{object}> .", self.subject);
    }

    fn reference(&mut self, predicate: &str, reference: &str) {
        let object = resolve(reference, self.base_url);
        self.iri(predicate, &object);
    }

    fn literal(&mut self, predicate: &str, value: &str) {
        let _ = writeln!(
            self.out,
            "<{}> <{predicate}> \"{}\" .",
            self.subject,
            escape_ntriples(value)
        );
    }

    fn text(&mut self, label: &Option<String>, comment: &Option<String>) {
        if let Some(label) = non_empty(label) {
            self.literal(&format!("{RDFS_NS}label"), label);
        }
        if let Some(comment) = non_empty(comment) {
            self.literal(&format!("{RDFS_NS}comment"), comment);
        }
    }
}

fn rdf_type() -> String {
    format!("{RDF_NS}type")
}

fn class_triples(out: String, name: &str, class: &VocabularyClass, base_url: &str) -> String {
    let mut triples = Triples::new(out, name, base_url);
    triples.iri(&rdf_type(), &format!("{RDFS_NS}Class"));
    triples.text(&class.label, &class.comment);
    let sub_class_of = format!("{RDFS_NS}subClassOf");
    for parent in &class.sub_class_of {
        triples.reference(&sub_class_of, parent);
    }
    let properties = resolve("properties", base_url);
    for prop in &class.properties {
        triples.literal(&properties, prop);
    }
    triples.out
}

fn property_triples(out: String, name: &str, prop: &VocabularyProperty, base_url: &str) -> String {
    let mut triples = Triples::new(out, name, base_url);
    triples.iri(&rdf_type(), &format!("{RDF_NS}Property"));
    triples.text(&prop.label, &prop.comment);
    let range = format!("{RDFS_NS}range");
    for reference in &prop.range {
        triples.reference(&range, reference);
    }
    let domain = format!("{RDFS_NS}domain");
    for reference in &prop.domain {
        triples.reference(&domain, reference);
    }
    triples.out
}

/// All class triples, then all property triples, with no blank lines.
pub fn vocabulary_to_ntriples(vocab: &Vocabulary, options: &ConvertOptions) -> String {
    let base_url = options.base_url.as_str();
    let out = vocab
        .classes
        .iter()
        .fold(String::new(), |out, (name, class)| {
            class_triples(out, name, class, base_url)
        });
    vocab
        .properties
        .iter()
        .fold(out, |out, (name, prop)| property_triples(out, name, prop, base_url))
}

pub fn class_to_ntriples(name: &str, class: &VocabularyClass, options: &ConvertOptions) -> String {
    class_triples(String::new(), name, class, &options.base_url)
}

pub fn property_to_ntriples(
    name: &str,
    prop: &VocabularyProperty,
    options: &ConvertOptions,
) -> String {
    property_triples(String::new(), name, prop, &options.base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::fixtures;

    #[test]
    fn class_emits_one_triple_per_statement() {
        let out = class_to_ntriples("Course", &fixtures::course(), &ConvertOptions::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "<http://oerschema.org/Course> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2000/01/rdf-schema#Class> .",
                "<http://oerschema.org/Course> <http://www.w3.org/2000/01/rdf-schema#label> \"Course\" .",
                "<http://oerschema.org/Course> <http://www.w3.org/2000/01/rdf-schema#comment> \"An instructional course\" .",
                "<http://oerschema.org/Course> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://oerschema.org/Resource> .",
                "<http://oerschema.org/Course> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://schema.org/Course> .",
                "<http://oerschema.org/Course> <http://oerschema.org/properties> \"courseIdentifier\" .",
            ]
        );
    }

    #[test]
    fn no_prefixed_names_appear() {
        let out = vocabulary_to_ntriples(&fixtures::vocabulary(), &ConvertOptions::default());
        assert!(!out.contains("oer:"));
        assert!(!out.contains("@prefix"));
        for line in out.lines() {
            assert!(line.starts_with('<') && line.ends_with(" ."), "{line}");
        }
    }

    #[test]
    fn bare_class_omits_label_and_comment() {
        let class = VocabularyClass {
            label: Some(String::new()),
            ..Default::default()
        };
        let out = class_to_ntriples("Bare", &class, &ConvertOptions::default());
        assert!(!out.contains("rdf-schema#label"));
        assert!(!out.contains("rdf-schema#comment"));
        assert_eq!(
            out,
            "<http://oerschema.org/Bare> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2000/01/rdf-schema#Class> .\n"
        );
    }

    #[test]
    fn literals_escape_line_breaks() {
        let prop = VocabularyProperty {
            comment: Some("two\nlines".to_string()),
            ..Default::default()
        };
        let out = property_to_ntriples("p", &prop, &ConvertOptions::default());
        assert!(out.contains(r#""two\nlines" ."#));
        assert_eq!(out.lines().count(), 2);
    }
}
