//! Lenient markup parsing.
//!
//! Act files span three decades of publishing tooling; many are not
//! well-formed. Parsing goes through html5ever's recovering parser, then
//! the resulting DOM is converted into the owned [`Element`] tree. Comments
//! and processing instructions are dropped.

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::tree::Element;

/// Parse a markup string into an element tree.
///
/// Never fails: malformed input is recovered into the best-effort tree the
/// HTML5 algorithm produces. Returns the root (`html`) element, or an
/// empty one for degenerate input.
#[must_use]
pub fn parse_markup(input: &str) -> Element {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(input);
    first_element_child(&dom.document)
        .map(|handle| convert_element(&handle))
        .unwrap_or_else(|| Element::new("html"))
}

/// First element child of a DOM node, skipping doctype/comments/text.
fn first_element_child(handle: &Handle) -> Option<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
}

/// Convert one rcdom element and its subtree, folding text nodes into
/// `text`/`tail` slots.
fn convert_element(handle: &Handle) -> Element {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return Element::new("");
    };

    let mut element = Element::new(name.local.to_string());
    for attr in attrs.borrow().iter() {
        element
            .attrs
            .push((attr.name.local.to_string(), attr.value.to_string()));
    }

    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                append_text(&mut element, &contents.borrow());
            }
            NodeData::Element { .. } => {
                element.children.push(convert_element(child));
            }
            // Comments, doctypes, and PIs carry no act content
            _ => {}
        }
    }

    element
}

/// Append a text run to the element: before the first child it lands in
/// `text`, after that on the last child's `tail`.
fn append_text(element: &mut Element, run: &str) {
    if run.is_empty() {
        return;
    }
    match element.children.last_mut() {
        Some(last) => match &mut last.tail {
            Some(tail) => tail.push_str(run),
            None => last.tail = Some(run.to_string()),
        },
        None => match &mut element.text {
            Some(text) => text.push_str(run),
            None => element.text = Some(run.to_string()),
        },
    }
}
