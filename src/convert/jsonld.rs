use super::{ConvertOptions, ConvertResult, to_json};
use crate::uri::{RDF_NS, RDFS_NS, SCHEMA_NS, compact};
use crate::vocabulary::{Vocabulary, VocabularyClass, VocabularyProperty, non_empty};
use serde::Serialize;

#[derive(Serialize)]
struct IdTerm {
    #[serde(rename = "@id")]
    id: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
}

const fn id_term(id: &'static str) -> IdTerm {
    IdTerm { id, kind: "@id" }
}

/// The fixed `@context`. Aliases not needed by a document are left out, the
/// rest keep their relative order.
#[derive(Serialize)]
struct Context<'a> {
    oer: &'a str,
    schema: &'static str,
    rdfs: &'static str,
    rdf: &'static str,
    #[serde(rename = "Class", skip_serializing_if = "Option::is_none")]
    class: Option<&'static str>,
    #[serde(rename = "Property", skip_serializing_if = "Option::is_none")]
    property: Option<&'static str>,
    #[serde(rename = "subClassOf", skip_serializing_if = "Option::is_none")]
    sub_class_of: Option<IdTerm>,
    comment: &'static str,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<IdTerm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<IdTerm>,
}

impl<'a> Context<'a> {
    fn new(base_url: &'a str, classes: bool, properties: bool) -> Self {
        Self {
            oer: base_url,
            schema: SCHEMA_NS,
            rdfs: RDFS_NS,
            rdf: RDF_NS,
            class: classes.then_some("rdfs:Class"),
            property: properties.then_some("rdf:Property"),
            sub_class_of: classes.then(|| id_term("rdfs:subClassOf")),
            comment: "rdfs:comment",
            label: "rdfs:label",
            domain: properties.then(|| id_term("rdfs:domain")),
            range: properties.then(|| id_term("rdfs:range")),
        }
    }
}

#[derive(Serialize)]
struct ClassNode<'a> {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    kind: &'static str,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    #[serde(rename = "subClassOf")]
    sub_class_of: Vec<String>,
    properties: &'a [String],
}

impl<'a> ClassNode<'a> {
    fn new(name: &'a str, class: &'a VocabularyClass) -> Self {
        Self {
            id: compact(name),
            kind: "Class",
            label: class.display_label(name),
            comment: non_empty(&class.comment),
            sub_class_of: class.sub_class_of.iter().map(|p| compact(p)).collect(),
            properties: &class.properties,
        }
    }
}

#[derive(Serialize)]
struct PropertyNode<'a> {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    kind: &'static str,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    domain: Vec<String>,
    range: Vec<String>,
}

impl<'a> PropertyNode<'a> {
    fn new(name: &'a str, prop: &'a VocabularyProperty) -> Self {
        Self {
            id: compact(name),
            kind: "Property",
            label: prop.display_label(name),
            comment: non_empty(&prop.comment),
            domain: prop.domain.iter().map(|d| compact(d)).collect(),
            range: prop.range.iter().map(|r| compact(r)).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum GraphNode<'a> {
    Class(ClassNode<'a>),
    Property(PropertyNode<'a>),
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    #[serde(rename = "@context")]
    context: Context<'a>,
    #[serde(rename = "@graph")]
    graph: Vec<GraphNode<'a>>,
}

#[derive(Serialize)]
struct NodeDocument<'a, T> {
    #[serde(rename = "@context")]
    context: Context<'a>,
    #[serde(flatten)]
    node: T,
}

/// Whole vocabulary as a `@graph`: every class, then every property, in
/// declaration order.
pub fn vocabulary_to_jsonld(vocab: &Vocabulary, options: &ConvertOptions) -> ConvertResult {
    let classes = vocab
        .classes
        .iter()
        .map(|(name, class)| GraphNode::Class(ClassNode::new(name, class)));
    let properties = vocab
        .properties
        .iter()
        .map(|(name, prop)| GraphNode::Property(PropertyNode::new(name, prop)));

    let document = GraphDocument {
        context: Context::new(&options.base_url, true, true),
        graph: classes.chain(properties).collect(),
    };
    to_json(&document, options.pretty)
}

pub fn class_to_jsonld(
    name: &str,
    class: &VocabularyClass,
    options: &ConvertOptions,
) -> ConvertResult {
    let document = NodeDocument {
        context: Context::new(&options.base_url, true, false),
        node: ClassNode::new(name, class),
    };
    to_json(&document, options.pretty)
}

pub fn property_to_jsonld(
    name: &str,
    prop: &VocabularyProperty,
    options: &ConvertOptions,
) -> ConvertResult {
    let document = NodeDocument {
        context: Context::new(&options.base_url, false, true),
        node: PropertyNode::new(name, prop),
    };
    to_json(&document, options.pretty)
}
