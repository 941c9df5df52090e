//! In-place citation linking.
//!
//! Two passes over a parsed tree. The cleanup pass removes leftover
//! footnote anchors whose numbers would otherwise be swallowed into
//! citation matches. The linking pass scans every text run, wraps each
//! citation in an anchor, and resolves it to a local repository href.
//! Existing anchors are never descended into, so running the linker twice
//! changes nothing the second time.

pub mod resolver;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::REFERENCE_URI_BASE;
use crate::markup::Element;
use resolver::{resolve, Resolution, CITATION};

/// Footnote anchor carrying its own parentheses, e.g. `<a>(1)</a>`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static STRICT_FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d+\)$").expect("valid regex"));

/// Digit-only anchor; stale only when wrapped in parentheses by the
/// surrounding text.
#[allow(clippy::expect_used)]
static DIGIT_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// Result of linking one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Citation anchors inserted.
    pub created: usize,

    /// Stale footnote anchors removed.
    pub removed: usize,

    /// Identifiers that fell outside the plausible range; the markers
    /// were inserted without an href.
    pub suspects: Vec<String>,
}

impl LinkOutcome {
    /// True when the tree was mutated.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.created > 0 || self.removed > 0
    }
}

/// Clean stale footnotes, then link every citation in the tree.
pub fn link_tree(root: &mut Element) -> LinkOutcome {
    let mut outcome = LinkOutcome {
        removed: clean_stale_footnotes(root),
        ..LinkOutcome::default()
    };
    outcome.created = linkify(root, &mut outcome.suspects);
    outcome
}

/// Remove leftover footnote anchors, merging their tails back into the
/// preceding text run. The anchor's own number text is dropped.
fn clean_stale_footnotes(parent: &mut Element) -> usize {
    let mut removed = 0;
    let mut i = 0;
    while i < parent.children.len() {
        removed += clean_stale_footnotes(&mut parent.children[i]);

        if parent.children[i].tag == "a" && should_remove_anchor(parent, i) {
            let anchor = parent.children.remove(i);
            let tail = anchor.tail.unwrap_or_default();
            if i > 0 {
                parent.children[i - 1]
                    .tail
                    .get_or_insert_with(String::new)
                    .push_str(&tail);
            } else {
                parent.text.get_or_insert_with(String::new).push_str(&tail);
            }
            removed += 1;
            continue;
        }

        i += 1;
    }
    removed
}

/// Decide whether the anchor at `index` is a stale footnote; for the
/// digit-only form this also strips the enclosing parentheses from the
/// surrounding text runs.
fn should_remove_anchor(parent: &mut Element, index: usize) -> bool {
    let content = parent.children[index].full_text().trim().to_string();

    if STRICT_FOOTNOTE.is_match(&content) {
        return true;
    }
    if !DIGIT_ONLY.is_match(&content) {
        return false;
    }

    let prev_text = if index > 0 {
        parent.children[index - 1].tail.clone().unwrap_or_default()
    } else {
        parent.text.clone().unwrap_or_default()
    };
    let tail_text = parent.children[index].tail.clone().unwrap_or_default();

    if !(prev_text.trim_end().ends_with('(') && tail_text.trim_start().starts_with(')')) {
        return false;
    }

    if let Some(pos) = prev_text.rfind('(') {
        let stripped = format!("{}{}", &prev_text[..pos], &prev_text[pos + 1..]);
        if index > 0 {
            parent.children[index - 1].tail = Some(stripped);
        } else {
            parent.text = Some(stripped);
        }
    }
    if let Some(pos) = tail_text.find(')') {
        parent.children[index].tail =
            Some(format!("{}{}", &tail_text[..pos], &tail_text[pos + 1..]));
    }

    true
}

/// Scan the element's text and every child tail for citations, splicing
/// anchor markers into the child list. Children are walked in reverse so
/// insertions do not shift pending indices; anchors are not descended into.
fn linkify(el: &mut Element, suspects: &mut Vec<String>) -> usize {
    let mut created = 0;

    if let Some(text) = el.text.clone() {
        if let Some((prefix, markers)) = segment_markers(&text, suspects) {
            created += markers.len();
            el.text = Some(prefix);
            for (offset, marker) in markers.into_iter().enumerate() {
                el.children.insert(offset, marker);
            }
        }
    }

    for i in (0..el.children.len()).rev() {
        if el.children[i].tag != "a" {
            created += linkify(&mut el.children[i], suspects);
        }

        if let Some(tail) = el.children[i].tail.clone() {
            if let Some((prefix, markers)) = segment_markers(&tail, suspects) {
                created += markers.len();
                el.children[i].tail = Some(prefix);
                for (offset, marker) in markers.into_iter().enumerate() {
                    el.children.insert(i + 1 + offset, marker);
                }
            }
        }
    }

    created
}

/// Split one text run around its citation matches.
///
/// Returns the text before the first match plus one anchor per citation,
/// each carrying the inter-match text as its tail. `None` when the run
/// contains no citation.
fn segment_markers(text: &str, suspects: &mut Vec<String>) -> Option<(String, Vec<Element>)> {
    let matches: Vec<regex::Captures<'_>> = CITATION.captures_iter(text).collect();
    let first = matches.first()?.get(0)?;
    let prefix = text[..first.start()].to_string();

    let mut markers = Vec::with_capacity(matches.len());
    for (i, caps) in matches.iter().enumerate() {
        let Some(full) = caps.get(0) else { continue };

        let mut anchor = Element::new("a");
        anchor.text = Some(full.as_str().to_string());

        match resolve(caps) {
            Resolution::Resolved { celex, fragment } => {
                anchor.set_attr(
                    "href",
                    format!(
                        "{REFERENCE_URI_BASE}/{celex}{}",
                        fragment.unwrap_or_default()
                    ),
                );
                anchor.set_attr("class", "celex-ref");
            }
            Resolution::Suspect { celex } => suspects.push(celex),
        }

        let next_start = matches
            .get(i + 1)
            .and_then(|c| c.get(0))
            .map_or(text.len(), |m| m.start());
        anchor.tail = Some(text[full.end()..next_start].to_string());
        markers.push(anchor);
    }

    Some((prefix, markers))
}
