//! RDFa fragments: one `<div>` per term, every field a `meta` or `link`
//! child carrying a `property` attribute.

use super::ConvertOptions;
use crate::escape::escape_html_attr;
use crate::uri::{OWL_NS, RDF_NS, RDFS_NS, SCHEMA_NS, resolve};
use crate::vocabulary::{VocabularyClass, VocabularyProperty, non_empty};
use std::fmt::Write;

struct Fragment<'a> {
    out: String,
    base_url: &'a str,
}

impl<'a> Fragment<'a> {
    fn open(name: &str, rdf_type: &str, base_url: &'a str) -> Self {
        let base = escape_html_attr(base_url);
        let out = format!(
            "<div vocab=\"{base}\" prefix=\"rdf: {RDF_NS} rdfs: {RDFS_NS} owl: {OWL_NS} schema: {SCHEMA_NS} oer: {base}\" resource=\"{}\" typeof=\"{rdf_type}\">\n",
            escape_html_attr(&resolve(name, base_url)),
        );
        Self { out, base_url }
    }

    fn meta(&mut self, property: &str, content: &str) {
        let _ = writeln!(
            self.out,
            "  <meta property=\"{property}\" content=\"{}\">",
            escape_html_attr(content)
        );
    }

    fn link(&mut self, property: &str, reference: &str) {
        let _ = writeln!(
            self.out,
            "  <link property=\"{property}\" href=\"{}\">",
            escape_html_attr(&resolve(reference, self.base_url))
        );
    }

    fn text(&mut self, label: &Option<String>, comment: &Option<String>) {
        if let Some(label) = non_empty(label) {
            self.meta("rdfs:label", label);
        }
        if let Some(comment) = non_empty(comment) {
            self.meta("rdfs:comment", comment);
        }
    }

    fn close(mut self) -> String {
        self.out.push_str("</div>\n");
        self.out
    }
}

pub fn class_to_rdfa(name: &str, class: &VocabularyClass, options: &ConvertOptions) -> String {
    let mut fragment = Fragment::open(name, "rdfs:Class", &options.base_url);
    fragment.text(&class.label, &class.comment);
    for parent in &class.sub_class_of {
        fragment.link("rdfs:subClassOf", parent);
    }
    for prop in &class.properties {
        fragment.meta("oer:properties", prop);
    }
    if let Some(alternate) = non_empty(&class.alternate_type) {
        fragment.link("owl:equivalentClass", alternate);
    }
    fragment.close()
}

pub fn property_to_rdfa(
    name: &str,
    prop: &VocabularyProperty,
    options: &ConvertOptions,
) -> String {
    let mut fragment = Fragment::open(name, "rdf:Property", &options.base_url);
    fragment.text(&prop.label, &prop.comment);
    for range in &prop.range {
        fragment.link("rdfs:range", range);
    }
    for domain in &prop.domain {
        fragment.link("rdfs:domain", domain);
    }
    if let Some(alternate) = non_empty(&prop.alternate_type) {
        fragment.link("owl:equivalentProperty", alternate);
    }
    if let Some(inverse) = non_empty(&prop.inverse_of) {
        fragment.link("owl:inverseOf", inverse);
    }
    if let Some(base_vocab) = non_empty(&prop.base_vocab) {
        fragment.link("rdfs:isDefinedBy", base_vocab);
    }
    fragment.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::fixtures;

    #[test]
    fn class_fields_become_attributes() {
        let out = class_to_rdfa("Course", &fixtures::course(), &ConvertOptions::default());
        assert!(out.starts_with("<div vocab=\"http://oerschema.org/\""));
        assert!(out.contains("resource=\"http://oerschema.org/Course\" typeof=\"rdfs:Class\""));
        assert!(out.contains("<meta property=\"rdfs:label\" content=\"Course\">"));
        assert!(out.contains("<link property=\"rdfs:subClassOf\" href=\"http://oerschema.org/Resource\">"));
        assert!(out.contains("<link property=\"rdfs:subClassOf\" href=\"http://schema.org/Course\">"));
        assert!(out.contains("<meta property=\"oer:properties\" content=\"courseIdentifier\">"));
        assert!(out.ends_with("</div>\n"));
    }

    #[test]
    fn free_text_is_attribute_escaped() {
        let out = property_to_rdfa(
            "courseIdentifier",
            &fixtures::course_identifier(),
            &ConvertOptions::default(),
        );
        assert!(out.contains("content=\"The course&apos;s &quot;code&quot;\""));
        assert!(!out.contains("\"code\""));
    }

    #[test]
    fn optional_relations_are_surfaced() {
        let prop = VocabularyProperty {
            alternate_type: Some("http://schema.org/url".to_string()),
            inverse_of: Some("hasPart".to_string()),
            base_vocab: Some("http://schema.org/".to_string()),
            ..Default::default()
        };
        let out = property_to_rdfa("url", &prop, &ConvertOptions::default());
        assert!(out.contains("<link property=\"owl:equivalentProperty\" href=\"http://schema.org/url\">"));
        assert!(out.contains("<link property=\"owl:inverseOf\" href=\"http://oerschema.org/hasPart\">"));
        assert!(out.contains("<link property=\"rdfs:isDefinedBy\" href=\"http://schema.org/\">"));
        assert!(!out.contains("rdfs:comment"));
    }
}
