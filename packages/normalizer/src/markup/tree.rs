//! Owned document tree with `text`/`tail` semantics.
//!
//! Each element owns the text before its first child (`text`) and the text
//! that follows its own closing tag within the parent (`tail`). This is the
//! model the reference linker needs: markers can be spliced into a text run
//! without disturbing the surrounding text, and removed again by merging
//! their tail back into the neighbour.

use super::text::normalize;

/// A single element node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name, lowercased by the parser.
    pub tag: String,

    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,

    /// Text between the start tag and the first child.
    pub text: Option<String>,

    /// Text between this element's end tag and the next sibling.
    pub tail: Option<String>,

    /// Child elements in source order.
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// The `class` attribute, or empty string.
    #[must_use]
    pub fn class(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    /// The `style` attribute, or empty string.
    #[must_use]
    pub fn style(&self) -> &str {
        self.attr("style").unwrap_or("")
    }

    /// The `id` attribute, or empty string.
    #[must_use]
    pub fn id(&self) -> &str {
        self.attr("id").unwrap_or("")
    }

    /// Substring match on the class attribute, mirroring the
    /// `contains(@class, ...)` checks the dialect markers are defined by.
    #[must_use]
    pub fn has_class_containing(&self, needle: &str) -> bool {
        self.class().contains(needle)
    }

    /// Substring match on the style attribute (case-insensitive).
    #[must_use]
    pub fn style_contains(&self, needle: &str) -> bool {
        self.style().to_lowercase().contains(&needle.to_lowercase())
    }

    /// Prefix match on the id attribute.
    #[must_use]
    pub fn id_starts_with(&self, prefix: &str) -> bool {
        self.id().starts_with(prefix)
    }

    /// Iterate this element and all descendants in document order.
    #[must_use]
    pub fn iter(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Iterate all descendants (excluding this element) in document order.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Find the first descendant (excluding self) matching the predicate.
    pub fn find_descendant(&self, pred: impl Fn(&Element) -> bool) -> Option<&Element> {
        self.descendants().find(|e| pred(e))
    }

    /// Concatenate all text runs in the subtree: own text, then each
    /// child's subtree text followed by its tail. The element's own tail
    /// is not included.
    pub fn push_subtree_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.push_subtree_text(out);
            if let Some(tail) = &child.tail {
                out.push_str(tail);
            }
        }
    }

    /// Raw concatenated subtree text.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.push_subtree_text(&mut out);
        out
    }

    /// Normalized subtree text: NFKC, dash/nbsp replacement, whitespace
    /// collapsed to single spaces. Runs are joined with a space first, so
    /// words split across inline elements stay separated.
    #[must_use]
    pub fn clean_text(&self) -> String {
        let mut out = String::new();
        self.push_spaced_text(&mut out);
        normalize(&out)
    }

    fn push_spaced_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
        for child in &self.children {
            child.push_spaced_text(out);
            if let Some(tail) = &child.tail {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(tail);
            }
        }
    }

    /// Direct text of the element only (no children), normalized.
    #[must_use]
    pub fn clean_direct_text(&self) -> String {
        normalize(self.text.as_deref().unwrap_or(""))
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        for child in next.children.iter().rev() {
            self.stack.push(child);
        }
        Some(next)
    }
}
