//! Text escaping for the serialization formats.
//!
//! Every function is a single pass over the input: escaping already-escaped
//! text escapes it again, so callers escape once, at final serialization.

use std::borrow::Cow;

/// Replaces `<`, `>`, `&`, `'` and `"` with their named XML entities.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Escapes a double-quoted Turtle string.
///
/// Beyond the `"` and `\` escapes, `\n` and `\r` are escaped as well because
/// a `"..."` literal cannot span lines. Every other character, tabs and
/// markup included, is written unchanged.
pub fn escape_turtle(text: &str) -> Cow<'_, str> {
    escape_with(text, |c| match c {
        '"' => Some("\\\""),
        '\\' => Some("\\\\"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        _ => None,
    })
}

/// N-Triples literals follow the Turtle string rules.
pub fn escape_ntriples(text: &str) -> Cow<'_, str> {
    escape_turtle(text)
}

/// Escapes a value placed inside a double-quoted HTML attribute.
pub fn escape_html_attr(text: &str) -> Cow<'_, str> {
    escape_xml(text)
}

fn escape_with(text: &str, replacement: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    let Some(first) = text.find(|c| replacement(c).is_some()) else {
        return Cow::Borrowed(text);
    };

    let mut escaped = String::with_capacity(text.len() + 8);
    escaped.push_str(&text[..first]);
    for c in text[first..].chars() {
        match replacement(c) {
            Some(rep) => escaped.push_str(rep),
            None => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_escapes_all_five_characters_once() {
        assert_eq!(
            escape_xml(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
        assert_eq!(escape_xml("&amp;"), "&amp;amp;");
        assert_eq!(escape_xml(""), "");
    }

    #[test]
    fn turtle_escapes_quotes_backslashes_and_line_breaks() {
        assert_eq!(escape_turtle(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);
        assert_eq!(escape_turtle("line\nbreak <&>"), r"line\nbreak <&>");
        assert!(matches!(escape_turtle("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn turtle_leaves_everything_else_unchanged() {
        let text = "tab\there <b>&'x'</b> é ✓";
        assert!(matches!(escape_turtle(text), Cow::Borrowed(t) if t == text));
    }

    #[test]
    fn ntriples_escapes_line_breaks() {
        assert_eq!(escape_ntriples("a\r\n\"b\""), r#"a\r\n\"b\""#);
    }

    #[test]
    fn html_attr_matches_xml_rules() {
        assert_eq!(escape_html_attr(r#""A&B""#), "&quot;A&amp;B&quot;");
    }
}
