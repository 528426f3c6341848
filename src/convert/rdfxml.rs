use super::ConvertOptions;
use crate::escape::escape_xml;
use crate::uri::{RDF_NS, RDFS_NS, SCHEMA_NS, resolve};
use crate::vocabulary::{Vocabulary, VocabularyClass, VocabularyProperty, non_empty};
use std::fmt::Write;

fn open_document(base_url: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <rdf:RDF xmlns:rdf=\"{RDF_NS}\"\n         \
         xmlns:rdfs=\"{RDFS_NS}\"\n         \
         xmlns:oer=\"{}\"\n         \
         xmlns:schema=\"{SCHEMA_NS}\">\n\n",
        escape_xml(base_url)
    )
}

const CLOSE_DOCUMENT: &str = "</rdf:RDF>";

fn write_text(out: &mut String, label: &Option<String>, comment: &Option<String>) {
    if let Some(label) = non_empty(label) {
        let _ = writeln!(out, "    <rdfs:label>{}</rdfs:label>", escape_xml(label));
    }
    if let Some(comment) = non_empty(comment) {
        let _ = writeln!(out, "    <rdfs:comment>{}</rdfs:comment>", escape_xml(comment));
    }
}

fn write_resource(out: &mut String, element: &str, reference: &str, base_url: &str) {
    let _ = writeln!(
        out,
        "    <{element} rdf:resource=\"{}\"/>",
        escape_xml(&resolve(reference, base_url))
    );
}

fn class_block(out: &mut String, name: &str, class: &VocabularyClass, base_url: &str) {
    let _ = writeln!(
        out,
        "  <rdfs:Class rdf:about=\"{}\">",
        escape_xml(&resolve(name, base_url))
    );
    write_text(out, &class.label, &class.comment);
    for parent in &class.sub_class_of {
        write_resource(out, "rdfs:subClassOf", parent, base_url);
    }
    for prop in &class.properties {
        let _ = writeln!(out, "    <oer:properties>{}</oer:properties>", escape_xml(prop));
    }
    out.push_str("  </rdfs:Class>\n\n");
}

fn property_block(out: &mut String, name: &str, prop: &VocabularyProperty, base_url: &str) {
    let _ = writeln!(
        out,
        "  <rdf:Property rdf:about=\"{}\">",
        escape_xml(&resolve(name, base_url))
    );
    write_text(out, &prop.label, &prop.comment);
    for range in &prop.range {
        write_resource(out, "rdfs:range", range, base_url);
    }
    for domain in &prop.domain {
        write_resource(out, "rdfs:domain", domain, base_url);
    }
    out.push_str("  </rdf:Property>\n\n");
}

pub fn vocabulary_to_xml(vocab: &Vocabulary, options: &ConvertOptions) -> String {
    let base_url = options.base_url.as_str();
    let mut xml = open_document(base_url);
    for (name, class) in &vocab.classes {
        class_block(&mut xml, name, class, base_url);
    }
    for (name, prop) in &vocab.properties {
        property_block(&mut xml, name, prop, base_url);
    }
    xml.push_str(CLOSE_DOCUMENT);
    xml
}

pub fn class_to_xml(name: &str, class: &VocabularyClass, options: &ConvertOptions) -> String {
    let mut xml = open_document(&options.base_url);
    class_block(&mut xml, name, class, &options.base_url);
    xml.push_str(CLOSE_DOCUMENT);
    xml
}

pub fn property_to_xml(name: &str, prop: &VocabularyProperty, options: &ConvertOptions) -> String {
    let mut xml = open_document(&options.base_url);
    property_block(&mut xml, name, prop, &options.base_url);
    xml.push_str(CLOSE_DOCUMENT);
    xml
}
