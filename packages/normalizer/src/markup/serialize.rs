//! Markup serialization for writing linked trees back to disk.
//!
//! Output is XHTML-flavoured: void elements self-close, text and attribute
//! values are entity-escaped. The round trip is not byte-identical with the
//! input (the recovering parser already rewrote it), but it is stable: a
//! serialized tree re-parses to an equal tree.

use super::tree::Element;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Serialize an element tree to a markup string.
#[must_use]
pub fn to_markup(root: &Element) -> String {
    let mut out = String::new();
    write_element(root, &mut out);
    out
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }

    let is_void = VOID_ELEMENTS.contains(&element.tag.as_str())
        && element.children.is_empty()
        && element.text.is_none();
    if is_void {
        out.push_str("/>");
        return;
    }

    out.push('>');
    if let Some(text) = &element.text {
        escape_text(text, out);
    }
    for child in &element.children {
        write_element(child, out);
        if let Some(tail) = &child.tail {
            escape_text(tail, out);
        }
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
