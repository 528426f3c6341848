use super::ConvertOptions;
use crate::escape::escape_turtle;
use crate::uri::{RDF_NS, RDFS_NS, SCHEMA_NS, is_absolute};
use crate::vocabulary::{Vocabulary, VocabularyClass, VocabularyProperty, non_empty};
use std::fmt::Write;

fn prefixes(base_url: &str) -> String {
    format!(
        "@prefix rdf: <{RDF_NS}> .\n\
         @prefix rdfs: <{RDFS_NS}> .\n\
         @prefix oer: <{base_url}> .\n\
         @prefix schema: <{SCHEMA_NS}> .\n\n"
    )
}

fn term(reference: &str) -> String {
    if is_absolute(reference) {
        format!("<{reference}>")
    } else {
        format!("oer:{reference}")
    }
}

/// Builds one `subject a type ; p o ; ... .` statement chain.
struct Statement {
    out: String,
}

impl Statement {
    fn new(name: &str, rdf_type: &str) -> Self {
        Self {
            out: format!("oer:{name} a {rdf_type}"),
        }
    }

    fn object(&mut self, predicate: &str, object: &str) -> &mut Self {
        let _ = write!(self.out, " ;\n    {predicate} {object}");
        self
    }

    fn literal(&mut self, predicate: &str, value: &str) -> &mut Self {
        let _ = write!(self.out, " ;\n    {predicate} \"{}\"", escape_turtle(value));
        self
    }

    fn text(&mut self, label: &Option<String>, comment: &Option<String>) -> &mut Self {
        if let Some(label) = non_empty(label) {
            self.literal("rdfs:label", label);
        }
        if let Some(comment) = non_empty(comment) {
            self.literal("rdfs:comment", comment);
        }
        self
    }

    fn finish(mut self) -> String {
        self.out.push_str(" .\n");
        self.out
    }
}

fn class_statement(name: &str, class: &VocabularyClass) -> String {
    let mut statement = Statement::new(name, "rdfs:Class");
    statement.text(&class.label, &class.comment);
    for parent in &class.sub_class_of {
        statement.object("rdfs:subClassOf", &term(parent));
    }
    for prop in &class.properties {
        statement.literal("oer:properties", prop);
    }
    statement.finish()
}

fn property_statement(name: &str, prop: &VocabularyProperty) -> String {
    let mut statement = Statement::new(name, "rdf:Property");
    statement.text(&prop.label, &prop.comment);
    for range in &prop.range {
        statement.object("rdfs:range", &term(range));
    }
    for domain in &prop.domain {
        statement.object("rdfs:domain", &term(domain));
    }
    statement.finish()
}

/// Every class then every property, one blank-line separated chain each.
pub fn vocabulary_to_turtle(vocab: &Vocabulary, options: &ConvertOptions) -> String {
    let mut turtle = prefixes(&options.base_url);
    for (name, class) in &vocab.classes {
        turtle.push_str(&class_statement(name, class));
        turtle.push('\n');
    }
    for (name, prop) in &vocab.properties {
        turtle.push_str(&property_statement(name, prop));
        turtle.push('\n');
    }
    turtle
}

pub fn class_to_turtle(name: &str, class: &VocabularyClass, options: &ConvertOptions) -> String {
    prefixes(&options.base_url) + &class_statement(name, class)
}

pub fn property_to_turtle(
    name: &str,
    prop: &VocabularyProperty,
    options: &ConvertOptions,
) -> String {
    prefixes(&options.base_url) + &property_statement(name, prop)
}
