use oerschema::convert::{
    ConvertOptions, class_to_json_schema, class_to_microdata, class_to_rdfa, class_to_turtle,
    class_to_xml, property_to_json_schema, property_to_ntriples, render, vocabulary_to_jsonld,
    vocabulary_to_turtle,
};
use oerschema::{ConvertError, Format, Target, Vocabulary};
use serde_json::{Value, json};

const VOCABULARY: &str = r#"
version: 2.1.0
classes:
  Thing:
    label: Thing
    subClassOf: http://schema.org/Thing
  Lesson:
    label: Lesson <1> & "more"
    comment: Tom's lesson
    subClassOf:
    - Thing
    - https://schema.org/LearningResource
    - Missing
    properties: [duration, forLesson]
    alternateType: http://schema.org/Course
properties:
  duration:
    comment: How long it takes
    range: Integer
    domain: Lesson
  forLesson:
    label: forLesson
    range: [Lesson, URL]
    domain: [Lesson]
    inverseOf: hasLesson
"#;

fn vocabulary() -> Vocabulary {
    Vocabulary::from_yaml_str(VOCABULARY).expect("vocabulary parses")
}

fn lesson(vocab: &Vocabulary) -> &oerschema::VocabularyClass {
    vocab.class("Lesson").unwrap()
}

#[test]
fn single_strings_load_as_sequences() {
    let vocab = vocabulary();
    assert_eq!(vocab.class("Thing").unwrap().sub_class_of, ["http://schema.org/Thing"]);
    assert_eq!(vocab.property("duration").unwrap().domain, ["Lesson"]);
    assert!(vocab.class("Thing").unwrap().properties.is_empty());
}

#[test]
fn turtle_escapes_literals_and_keeps_absolute_parents() {
    let vocab = vocabulary();
    let out = class_to_turtle("Lesson", lesson(&vocab), &ConvertOptions::default());

    assert!(out.contains(r#"rdfs:label "Lesson <1> & \"more\"""#));
    assert!(out.contains("rdfs:subClassOf oer:Thing"));
    assert!(out.contains("rdfs:subClassOf <https://schema.org/LearningResource>"));
    // Dangling references are emitted, not rejected
    assert!(out.contains("rdfs:subClassOf oer:Missing"));
    assert!(out.ends_with(" .\n"));
}

#[test]
fn rdf_xml_escapes_entities() {
    let vocab = vocabulary();
    let out = class_to_xml("Lesson", lesson(&vocab), &ConvertOptions::default());

    assert!(out.contains("<rdfs:label>Lesson &lt;1&gt; &amp; &quot;more&quot;</rdfs:label>"));
    assert!(out.contains("<rdfs:comment>Tom&apos;s lesson</rdfs:comment>"));
    assert!(out.contains("<rdfs:subClassOf rdf:resource=\"https://schema.org/LearningResource\"/>"));
}

#[test]
fn base_url_changes_every_local_reference() {
    let vocab = vocabulary();
    let options = ConvertOptions::new("https://example.edu/oer/");

    let turtle = class_to_turtle("Lesson", lesson(&vocab), &options);
    assert!(turtle.contains("@prefix oer: <https://example.edu/oer/> ."));

    let ntriples = property_to_ntriples("forLesson", vocab.property("forLesson").unwrap(), &options);
    assert!(ntriples.contains(
        "<https://example.edu/oer/forLesson> <http://www.w3.org/2000/01/rdf-schema#range> <https://example.edu/oer/Lesson> ."
    ));
    assert!(!ntriples.contains("oerschema.org"));
}

#[test]
fn json_schema_maps_ranges_through_the_type_table() {
    let vocab = vocabulary();
    let out = class_to_json_schema("Lesson", lesson(&vocab), &ConvertOptions::default(), Some(&vocab))
        .unwrap();
    let schema: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
    assert_eq!(schema["title"], "Lesson");
    assert_eq!(schema["description"], "Tom's lesson");
    assert_eq!(
        schema["properties"]["duration"],
        json!({"type": "integer", "description": "How long it takes"})
    );
    // Lesson has no mapping, URL does
    assert_eq!(
        schema["properties"]["forLesson"],
        json!({"type": "string", "description": "", "format": "uri"})
    );
}

#[test]
fn json_schema_without_vocabulary_has_no_property_entries() {
    let vocab = vocabulary();
    let out = class_to_json_schema("Lesson", lesson(&vocab), &ConvertOptions::default(), None).unwrap();
    let schema: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(schema["properties"], json!({}));
}

#[test]
fn property_json_schema_describes_its_own_value() {
    let vocab = vocabulary();
    let out = property_to_json_schema(
        "forLesson",
        vocab.property("forLesson").unwrap(),
        &ConvertOptions::default(),
    )
    .unwrap();
    let schema: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(schema["title"], "forLesson");
    assert_eq!(schema["description"], "");
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["forLesson"]["type"], "string");
}

#[test]
fn rdfa_and_microdata_escape_attributes() {
    let vocab = vocabulary();
    let options = ConvertOptions::default();

    let rdfa = class_to_rdfa("Lesson", lesson(&vocab), &options);
    assert!(rdfa.contains("content=\"Lesson &lt;1&gt; &amp; &quot;more&quot;\""));
    assert!(rdfa.contains("<link property=\"owl:equivalentClass\" href=\"http://schema.org/Course\">"));

    let microdata = class_to_microdata("Lesson", lesson(&vocab), &options);
    assert!(microdata.starts_with("<div itemscope"));
    assert!(microdata.contains("itemid=\"http://oerschema.org/Lesson\""));
    assert!(microdata.contains("content=\"Tom&apos;s lesson\""));
}

#[test]
fn whole_vocabulary_jsonld_is_a_graph_in_declaration_order() {
    let vocab = vocabulary();
    let doc: Value =
        serde_json::from_str(&vocabulary_to_jsonld(&vocab, &ConvertOptions::default()).unwrap())
            .unwrap();

    let ids: Vec<&str> = doc["@graph"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["@id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["oer:Thing", "oer:Lesson", "oer:duration", "oer:forLesson"]);
    assert_eq!(doc["@context"]["oer"], "http://oerschema.org/");
}

#[test]
fn whole_vocabulary_turtle_has_one_prefix_block() {
    let out = vocabulary_to_turtle(&vocabulary(), &ConvertOptions::default());
    assert_eq!(out.matches("@prefix oer:").count(), 1);
    assert_eq!(out.matches(" a rdfs:Class").count(), 2);
    assert_eq!(out.matches(" a rdf:Property").count(), 2);
}

#[test]
fn conversions_are_deterministic() {
    let vocab = vocabulary();
    let options = ConvertOptions::default();
    for format in Format::all() {
        for target in [
            Target::Vocabulary,
            Target::Class("Lesson"),
            Target::Property("forLesson"),
        ] {
            let first = render(&vocab, target, format, &options).unwrap();
            let second = render(&vocab, target, format, &options).unwrap();
            assert_eq!(first, second, "{target:?} as {format}");
        }
    }
}

#[test]
fn empty_label_falls_back_to_nothing() {
    let vocab = Vocabulary::from_yaml_str(
        "classes:\n  Bare:\n    label: ''\n    comment: ''\n",
    )
    .unwrap();
    let out = class_to_turtle("Bare", vocab.class("Bare").unwrap(), &ConvertOptions::default());
    assert!(!out.contains("rdfs:label"));
    assert!(!out.contains("rdfs:comment"));
    assert!(out.ends_with("oer:Bare a rdfs:Class .\n"));
}

#[test]
fn unknown_terms_are_reported_not_rendered() {
    let err = render(
        &vocabulary(),
        Target::Property("missing"),
        Format::Turtle,
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "property 'missing' not found");
    assert!(matches!(err, ConvertError::EntityNotFound { .. }));
}
