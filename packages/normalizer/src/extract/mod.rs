//! Dialect extraction strategies.
//!
//! One strategy per dialect, all implementing [`ExtractStrategy`]. The
//! dispatch is keyed by the classifier's tag; `Uncategorized` files are
//! refused here rather than guessed at.
//!
//! Shared across strategies: the fixed legal boilerplate phrases that mark
//! preamble/body boundaries, the preamble splitter used by the two
//! consolidated dialects, and the scan for previously-injected reference
//! markers.

mod eli;
mod flat;
mod inline;
mod legacy;
mod transitional;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::REFERENCE_URI_BASE;
use crate::error::{NormalizerError, Result};
use crate::markup::Element;
use crate::types::{ActDocument, Dialect, Preamble, Recital, Reference};

pub use eli::EliStrategy;
pub use flat::FlatStrategy;
pub use inline::InlineStrategy;
pub use legacy::LegacyStrategy;
pub use transitional::TransitionalStrategy;

/// Phrase that opens the operative body ("it is hereby enacted").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static BODY_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(HÄRIGENOM FÖRESKRIVS|HÄRMED FÖRESKRIVS)").expect("valid regex")
});

/// Phrase that separates the preamble intro from the recitals ("whereas").
#[allow(clippy::expect_used)]
pub(crate) static RECITAL_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)med beaktande av följande").expect("valid regex"));

/// Article heading at the start of a line.
#[allow(clippy::expect_used)]
pub(crate) static ART_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Artikel\s+(\d+[a-z]*)").expect("valid regex"));

/// Annex heading at the start of a line.
#[allow(clippy::expect_used)]
pub(crate) static ANNEX_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^BILAGA(\s+([IVX0-9A-Z]+))?").expect("valid regex"));

/// Start of the preamble intro ("HAS ADOPTED ..." family of verbs).
#[allow(clippy::expect_used)]
pub(crate) static INTRO_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+HAR\s+(ANTAGIT|UTFÄRDAT|BESLUTAT|FASTSTÄLLT|MEDDELAT|FÖRESKRIVIT)")
        .expect("valid regex")
});

/// Start of the final provisions ("Done at ..." / signature block).
#[allow(clippy::expect_used)]
pub(crate) static FINAL_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(Utfärdad|Ufärdat|Utffärdad|På\s+rådets|På\s+kommissionens)")
        .expect("valid regex")
});

/// A dialect-specific extraction strategy.
///
/// Implementations walk the source tree and populate the (pre-created)
/// document record. They must preserve source order and never panic on
/// unexpected shapes; a shape they genuinely cannot proceed from is an
/// [`NormalizerError::Extraction`].
pub trait ExtractStrategy {
    fn extract(&self, root: &Element, doc: &mut ActDocument) -> Result<()>;
}

/// Extract a document record from a classified tree.
pub fn extract_document(root: &Element, celex: &str, dialect: Dialect) -> Result<ActDocument> {
    let strategy: &dyn ExtractStrategy = match dialect {
        Dialect::ModernEliOj | Dialect::ModernEliConsolidated => &EliStrategy,
        Dialect::ModernFlatConsolidated => &FlatStrategy,
        Dialect::ConsolidatedInline => &InlineStrategy,
        Dialect::Transitional => &TransitionalStrategy,
        Dialect::LegacyConfirmed => &LegacyStrategy,
        Dialect::Uncategorized => {
            return Err(NormalizerError::ClassificationGap {
                celex: celex.to_string(),
            })
        }
    };

    let mut doc = ActDocument::new(celex, dialect);
    strategy.extract(root, &mut doc)?;
    Ok(doc)
}

/// Collect references from previously-injected markers in a subtree.
///
/// A marker is an `a` element with class `celex-ref` whose href points
/// into the local act repository; the final path segment is
/// `<celex>[#A<fragment>]`.
pub(crate) fn collect_references(node: &Element) -> Vec<Reference> {
    let mut refs = Vec::new();
    for link in node
        .iter()
        .filter(|e| e.tag == "a" && e.has_class_containing("celex-ref"))
    {
        let Some(href) = link.attr("href") else {
            continue;
        };
        if !href.contains(base_path_marker()) {
            continue;
        }
        let Some(last) = href.rsplit('/').next() else {
            continue;
        };
        let mut parts = last.splitn(2, '#');
        let Some(celex) = parts.next().filter(|c| !c.is_empty()) else {
            continue;
        };
        let reference = match parts.next() {
            Some(frag) => Reference::new(celex).with_article(frag.trim_start_matches('A')),
            None => Reference::new(celex),
        };
        refs.push(reference);
    }
    refs
}

/// Path component identifying repository hrefs, independent of host.
fn base_path_marker() -> &'static str {
    // REFERENCE_URI_BASE ends in the repository segment
    REFERENCE_URI_BASE
        .rsplit('/')
        .next()
        .unwrap_or("eurlexacts")
}

/// Split a preamble container into intro text and recitals.
///
/// Used by the flat and inline consolidated dialects: paragraphs before
/// the "whereas" phrase accumulate into the intro, paragraphs after it
/// become numbered recitals, and the operative-body phrase ends the scan.
pub(crate) fn split_preamble(node: &Element, preamble: &mut Preamble) {
    let mut intro_parts: Vec<String> = Vec::new();
    let mut in_recitals = false;
    let mut recital_count = 1;

    if let Some(text) = &node.text {
        if RECITAL_SPLIT.is_match(text) {
            intro_parts.push(text.trim().to_string());
            in_recitals = true;
        }
    }

    for p in node.descendants().filter(|e| e.tag == "p") {
        let p_text = p.clean_text();
        if p_text.is_empty() {
            continue;
        }

        if BODY_TRIGGER.is_match(&p_text) {
            break;
        }

        if RECITAL_SPLIT.is_match(&p_text) {
            intro_parts.push(p_text);
            in_recitals = true;
            continue;
        }

        if in_recitals {
            preamble.recitals.push(Recital {
                id: recital_count.to_string(),
                text: p_text,
                references: collect_references(p),
            });
            recital_count += 1;
        } else {
            intro_parts.push(p_text);
        }

        if let Some(tail) = &p.tail {
            if RECITAL_SPLIT.is_match(tail) {
                intro_parts.push(tail.trim().to_string());
                in_recitals = true;
            }
        }
    }

    preamble.intro_text = intro_parts.join(" ");
}

/// Strip the "Artikel " prefix and trailing punctuation from a header.
pub(crate) fn article_id_from_header(text: &str) -> String {
    text.replace("Artikel ", "")
        .trim()
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;

    #[test]
    fn test_collect_references() {
        let root = parse_markup(
            "<html><body><p>\
             <a class=\"celex-ref\" href=\"http://localhost:8000/res/eurlexacts/32010R1234#A3\">x</a>\
             <a class=\"celex-ref\" href=\"http://localhost:8000/res/eurlexacts/31990L0001\">y</a>\
             <a href=\"http://other.example/32010R9999\">not a marker</a>\
             </p></body></html>",
        );
        let refs = collect_references(&root);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].celex, "32010R1234");
        assert_eq!(refs[0].article, Some("3".to_string()));
        assert_eq!(refs[1].celex, "31990L0001");
        assert_eq!(refs[1].article, None);
    }

    #[test]
    fn test_split_preamble_basic() {
        let root = parse_markup(
            "<html><body><div class=\"preamble\">\
             <p>EUROPAPARLAMENTET HAR ANTAGIT DENNA FÖRORDNING</p>\
             <p>med beaktande av följande:</p>\
             <p>Första skälet.</p>\
             <p>Andra skälet.</p>\
             <p>HÄRIGENOM FÖRESKRIVS FÖLJANDE.</p>\
             <p>Ska inte tas med.</p>\
             </div></body></html>",
        );
        let div = root.find_descendant(|e| e.class() == "preamble").unwrap();
        let mut preamble = Preamble::default();
        split_preamble(div, &mut preamble);

        assert!(preamble.intro_text.contains("HAR ANTAGIT"));
        assert!(preamble.intro_text.contains("med beaktande av följande"));
        assert_eq!(preamble.recitals.len(), 2);
        assert_eq!(preamble.recitals[0].id, "1");
        assert_eq!(preamble.recitals[0].text, "Första skälet.");
        assert_eq!(preamble.recitals[1].id, "2");
    }

    #[test]
    fn test_extract_document_uncategorized_is_gap() {
        let root = parse_markup("<html><body><p>x</p></body></html>");
        let err = extract_document(&root, "32010R1234", Dialect::Uncategorized).unwrap_err();
        assert!(matches!(err, NormalizerError::ClassificationGap { .. }));
    }

    #[test]
    fn test_article_id_from_header() {
        assert_eq!(article_id_from_header("Artikel 14a."), "14a");
        assert_eq!(article_id_from_header("Artikel 1"), "1");
    }

    #[test]
    fn test_boilerplate_patterns() {
        assert!(BODY_TRIGGER.is_match("HÄRIGENOM FÖRESKRIVS FÖLJANDE."));
        assert!(BODY_TRIGGER.is_match("härmed föreskrivs"));
        assert!(ART_START.is_match("Artikel 3a"));
        assert!(!ART_START.is_match("I Artikel 3"));
        assert!(ANNEX_START.is_match("BILAGA II"));
        assert!(FINAL_START.is_match("Utfärdad i Bryssel den 1 januari 2010."));
        assert!(INTRO_START.is_match("EUROPEISKA GEMENSKAPERNAS RÅD HAR ANTAGIT DENNA FÖRORDNING"));
    }
}
