//! Microdata fragments. `itemprop` values are absolute URIs since microdata
//! has no prefix mechanism.

use super::ConvertOptions;
use crate::escape::escape_html_attr;
use crate::uri::{OWL_NS, RDF_NS, RDFS_NS, resolve};
use crate::vocabulary::{VocabularyClass, VocabularyProperty, non_empty};
use std::fmt::Write;

struct Item<'a> {
    out: String,
    base_url: &'a str,
}

impl<'a> Item<'a> {
    fn open(name: &str, item_type: &str, base_url: &'a str) -> Self {
        let out = format!(
            "<div itemscope itemtype=\"{item_type}\" itemid=\"{}\">\n",
            escape_html_attr(&resolve(name, base_url))
        );
        Self { out, base_url }
    }

    fn meta(&mut self, itemprop: &str, content: &str) {
        let _ = writeln!(
            self.out,
            "  <meta itemprop=\"{}\" content=\"{}\">",
            escape_html_attr(itemprop),
            escape_html_attr(content)
        );
    }

    fn link(&mut self, itemprop: &str, reference: &str) {
        let _ = writeln!(
            self.out,
            "  <link itemprop=\"{itemprop}\" href=\"{}\">",
            escape_html_attr(&resolve(reference, self.base_url))
        );
    }

    fn text(&mut self, label: &Option<String>, comment: &Option<String>) {
        if let Some(label) = non_empty(label) {
            self.meta(&format!("{RDFS_NS}label"), label);
        }
        if let Some(comment) = non_empty(comment) {
            self.meta(&format!("{RDFS_NS}comment"), comment);
        }
    }

    fn close(mut self) -> String {
        self.out.push_str("</div>\n");
        self.out
    }
}

pub fn class_to_microdata(
    name: &str,
    class: &VocabularyClass,
    options: &ConvertOptions,
) -> String {
    let mut item = Item::open(name, &format!("{RDFS_NS}Class"), &options.base_url);
    item.text(&class.label, &class.comment);
    let sub_class_of = format!("{RDFS_NS}subClassOf");
    for parent in &class.sub_class_of {
        item.link(&sub_class_of, parent);
    }
    let properties = resolve("properties", &options.base_url);
    for prop in &class.properties {
        item.meta(&properties, prop);
    }
    if let Some(alternate) = non_empty(&class.alternate_type) {
        item.link(&format!("{OWL_NS}equivalentClass"), alternate);
    }
    item.close()
}

pub fn property_to_microdata(
    name: &str,
    prop: &VocabularyProperty,
    options: &ConvertOptions,
) -> String {
    let mut item = Item::open(name, &format!("{RDF_NS}Property"), &options.base_url);
    item.text(&prop.label, &prop.comment);
    let range = format!("{RDFS_NS}range");
    for reference in &prop.range {
        item.link(&range, reference);
    }
    let domain = format!("{RDFS_NS}domain");
    for reference in &prop.domain {
        item.link(&domain, reference);
    }
    if let Some(alternate) = non_empty(&prop.alternate_type) {
        item.link(&format!("{OWL_NS}equivalentProperty"), alternate);
    }
    if let Some(inverse) = non_empty(&prop.inverse_of) {
        item.link(&format!("{OWL_NS}inverseOf"), inverse);
    }
    if let Some(base_vocab) = non_empty(&prop.base_vocab) {
        item.link(&format!("{RDFS_NS}isDefinedBy"), base_vocab);
    }
    item.close()
}
