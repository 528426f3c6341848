use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, formats::PreferMany, serde_as};

/// A class term (an `rdfs:Class`) of the vocabulary.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Hierarchy marker, `"root"` on the class every resource derives from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Parent references, local term names or absolute URIs.
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    #[serde(default)]
    pub sub_class_of: Vec<String>,
    /// Names of the properties usable on instances of this class.
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_type: Option<String>,
}

/// A property term (an `rdf:Property`) of the vocabulary.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_vocab: Option<String>,
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    #[serde(default)]
    pub range: Vec<String>,
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    #[serde(default)]
    pub domain: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_of: Option<String>,
}

/// The complete vocabulary.
///
/// Loaded once and shared read-only; `classes` and `properties` iterate in
/// declaration order, which every whole-vocabulary serialization relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub classes: IndexMap<String, VocabularyClass>,
    #[serde(default)]
    pub properties: IndexMap<String, VocabularyProperty>,
}

/// Which kind of term a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Class,
    Property,
}

impl TermKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermKind::Class => "class",
            TermKind::Property => "property",
        }
    }
}

impl std::fmt::Display for TermKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local reference that names no class of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub kind: TermKind,
    /// Term holding the reference.
    pub term: String,
    /// Field the reference was found in (`subClassOf`, `domain`, `range`).
    pub field: &'static str,
    pub reference: String,
}

/// Entry of the class or property index listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSummary {
    pub name: String,
    pub label: String,
    pub url: String,
}

/// Returns the value when it is present and non-empty.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl VocabularyClass {
    /// Label to display, falling back to the term name.
    pub fn display_label<'a>(&'a self, name: &'a str) -> &'a str {
        non_empty(&self.label).unwrap_or(name)
    }
}

impl VocabularyProperty {
    pub fn display_label<'a>(&'a self, name: &'a str) -> &'a str {
        non_empty(&self.label).unwrap_or(name)
    }
}

impl Vocabulary {
    pub fn class(&self, name: &str) -> Option<&VocabularyClass> {
        self.classes.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&VocabularyProperty> {
        self.properties.get(name)
    }

    /// Names of the properties whose `domain` includes `class_name`.
    pub fn properties_for_domain(&self, class_name: &str) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.domain.iter().any(|d| d == class_name))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Index listing for one kind of term, in declaration order.
    pub fn summaries(&self, kind: TermKind) -> Vec<TermSummary> {
        let summary = |name: &String, label: &str| TermSummary {
            name: name.clone(),
            label: label.to_string(),
            url: format!("/schema/{}/{}", kind, name),
        };
        match kind {
            TermKind::Class => self
                .classes
                .iter()
                .map(|(name, class)| summary(name, class.display_label(name)))
                .collect(),
            TermKind::Property => self
                .properties
                .iter()
                .map(|(name, prop)| summary(name, prop.display_label(name)))
                .collect(),
        }
    }

    /// Local references that resolve to no class.
    ///
    /// Conversions never fail on these; they are reported for diagnostics only.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        let mut check = |kind: TermKind, term: &str, field: &'static str, refs: &[String]| {
            for reference in refs {
                if !crate::uri::is_absolute(reference) && !self.classes.contains_key(reference) {
                    dangling.push(DanglingReference {
                        kind,
                        term: term.to_string(),
                        field,
                        reference: reference.clone(),
                    });
                }
            }
        };

        for (name, class) in &self.classes {
            check(TermKind::Class, name, "subClassOf", &class.sub_class_of);
        }
        for (name, prop) in &self.properties {
            check(TermKind::Property, name, "domain", &prop.domain);
            check(TermKind::Property, name, "range", &prop.range);
        }
        dangling
    }
}
