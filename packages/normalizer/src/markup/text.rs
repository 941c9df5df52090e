//! Text normalization helpers.
//!
//! All extracted text and the validator's length accounting go through the
//! same normalization so lengths stay comparable: NFKC composition,
//! typographic dash and non-breaking-space replacement, and whitespace
//! collapse.

use unicode_normalization::UnicodeNormalization;

/// Normalize a raw text run.
///
/// # Examples
/// ```
/// use eurlex_normalizer::markup::normalize;
///
/// assert_eq!(normalize("  rådets \u{a0} förordning\n"), "rådets förordning");
/// assert_eq!(normalize("1999\u{2013}2004"), "1999-2004");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    let composed = composed.replace('\u{2013}', "-").replace('\u{a0}', " ");
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character count of the normalized form, as used by the completeness
/// validator on both sides of the comparison.
#[must_use]
pub fn normalized_len(text: &str) -> usize {
    normalize(text).chars().count()
}
