//! Format classification.
//!
//! An unlabeled act file is assigned to one of the closed set of dialects
//! by an ordered decision list over structural markers. The first matching
//! rule wins; files triggering no rule are `Uncategorized` and are skipped
//! by extraction rather than guessed at.

use crate::markup::Element;
use crate::types::Dialect;

/// Classify a parsed document tree into a dialect.
///
/// Rules, in priority order:
/// 1. an `eli-container` class → `ModernEliOj`, or `ModernEliConsolidated`
///    when a `disclaimer` class is also present anywhere;
/// 2. a `title-article-norm` class (flat consolidated headers) →
///    `ModernFlatConsolidated`;
/// 3. a `div` styled with the grey `#CCCCCC` preamble background →
///    `ConsolidatedInline`;
/// 4. a `ti-art` article-title class → `Transitional`;
/// 5. an `id="TexteOnly"` container or a `txt_te` element →
///    `LegacyConfirmed`;
/// 6. otherwise `Uncategorized`.
#[must_use]
pub fn classify(root: &Element) -> Dialect {
    if root
        .iter()
        .any(|e| e.has_class_containing("eli-container"))
    {
        if root.iter().any(|e| e.has_class_containing("disclaimer")) {
            return Dialect::ModernEliConsolidated;
        }
        return Dialect::ModernEliOj;
    }

    if root
        .iter()
        .any(|e| e.has_class_containing("title-article-norm"))
    {
        return Dialect::ModernFlatConsolidated;
    }

    if root
        .iter()
        .any(|e| e.tag == "div" && e.style_contains("#CCCCCC"))
    {
        return Dialect::ConsolidatedInline;
    }

    if root.iter().any(|e| e.has_class_containing("ti-art")) {
        return Dialect::Transitional;
    }

    if root
        .iter()
        .any(|e| e.id() == "TexteOnly" || e.tag == "txt_te")
    {
        return Dialect::LegacyConfirmed;
    }

    Dialect::Uncategorized
}
