//! Post-extraction validation.
//!
//! Every extracted record is compared against its source tree: the
//! character mass of the source must survive into the record within a
//! dialect-dependent tolerance, required sections must be present, and
//! numbered sequences must not run backwards. Failures never abort a run;
//! they become flagged report rows.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::markup::{normalize, normalized_len, Element};
use crate::types::{ActDocument, Dialect};

/// Consolidated files legitimately lose amendment-history tables.
const LOSS_TOLERANCE_CONSOLIDATED: i64 = 3000;
const LOSS_TOLERANCE_DEFAULT: i64 = 1000;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)").expect("valid regex"));

/// Row status in the validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowStatus {
    Ok,
    Fail,
    Skip,
    Crash,
}

impl RowStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
            Self::Crash => "CRASH",
        }
    }
}

/// One line of the validation report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub celex: String,
    pub dialect: Dialect,
    pub status: RowStatus,
    pub original_len: usize,
    pub json_len: usize,
    pub diff: i64,
    pub flags: Vec<String>,
}

impl ReportRow {
    /// Row for a file skipped by classification.
    #[must_use]
    pub fn skipped(celex: impl Into<String>) -> Self {
        Self {
            celex: celex.into(),
            dialect: Dialect::Uncategorized,
            status: RowStatus::Skip,
            original_len: 0,
            json_len: 0,
            diff: 0,
            flags: Vec::new(),
        }
    }

    /// Row for a file whose extraction failed outright.
    #[must_use]
    pub fn crashed(celex: impl Into<String>, dialect: Dialect, detail: impl Into<String>) -> Self {
        Self {
            celex: celex.into(),
            dialect,
            status: RowStatus::Crash,
            original_len: 0,
            json_len: 0,
            diff: 0,
            flags: vec![detail.into()],
        }
    }
}

/// Validate an extracted record against its source tree.
#[must_use]
pub fn validate(root: &Element, doc: &ActDocument) -> ReportRow {
    let dialect = doc.metadata.original_format;
    // Source mass uses the raw run concatenation, not the spaced
    // per-element cleaner.
    let original_len = normalize(&root.full_text()).chars().count();
    let json_len = document_char_len(doc);
    let diff = original_len as i64 - json_len as i64;

    let mut flags = Vec::new();

    let tolerance = if dialect.is_consolidated() {
        LOSS_TOLERANCE_CONSOLIDATED
    } else {
        LOSS_TOLERANCE_DEFAULT
    };
    if diff > tolerance {
        flags.push(format!("HIGH_DATA_LOSS_{diff}_chars"));
    }

    if doc.metadata.title.is_empty() {
        flags.push("MISSING_TITLE".to_string());
    }
    if !dialect.is_consolidated()
        && doc.preamble.intro_text.is_empty()
        && doc.preamble.recitals.is_empty()
    {
        flags.push("EMPTY_PREAMBLE".to_string());
    }
    if doc.body.is_empty() {
        flags.push("EMPTY_BODY".to_string());
    }
    if !dialect.is_consolidated()
        && doc.final_provisions.text.is_none()
        && doc.final_provisions.signatures.is_none()
    {
        flags.push("MISSING_FINAL_PROVISIONS".to_string());
    }

    if !is_non_decreasing(doc.preamble.recitals.iter().map(|r| r.id.as_str())) {
        flags.push("RECITALS_ORDER_ERR".to_string());
    }
    if !is_non_decreasing(doc.body.iter().map(|a| a.id.as_str())) {
        flags.push("ARTICLES_ORDER_ERR".to_string());
    }

    let status = if flags.is_empty() {
        RowStatus::Ok
    } else {
        RowStatus::Fail
    };

    ReportRow {
        celex: doc.metadata.celex.clone(),
        dialect,
        status,
        original_len,
        json_len,
        diff,
        flags,
    }
}

/// Character mass of every text field in the record, excluding the
/// identifier fields (which the source never spells out verbatim).
fn document_char_len(doc: &ActDocument) -> usize {
    let mut total = 0;

    total += normalized_len(&doc.metadata.title);
    total += normalized_len(&doc.metadata.date_published);
    total += normalized_len(&doc.metadata.language);
    total += normalized_len(doc.metadata.original_format.as_str());

    total += normalized_len(&doc.preamble.intro_text);
    for recital in &doc.preamble.recitals {
        total += normalized_len(&recital.id);
        total += normalized_len(&recital.text);
        for reference in &recital.references {
            if let Some(article) = &reference.article {
                total += normalized_len(article);
            }
        }
    }

    for article in &doc.body {
        total += "article".len();
        total += normalized_len(&article.id);
        if let Some(title) = &article.title {
            total += normalized_len(title);
        }
        for paragraph in &article.content {
            total += normalized_len(paragraph);
        }
        for reference in &article.references {
            if let Some(frag) = &reference.article {
                total += normalized_len(frag);
            }
        }
    }

    for annex in &doc.annexes {
        total += normalized_len(&annex.id);
        total += normalized_len(&annex.title);
        for paragraph in &annex.content {
            total += normalized_len(paragraph);
        }
        for reference in &annex.references {
            if let Some(frag) = &reference.article {
                total += normalized_len(frag);
            }
        }
    }

    if let Some(text) = &doc.final_provisions.text {
        total += normalized_len(text);
    }
    if let Some(signatures) = &doc.final_provisions.signatures {
        for line in signatures {
            total += normalized_len(line);
        }
    }

    total
}

/// Numbered ids ("1", "2", "14a") must not run backwards. Unnumbered ids
/// are ignored rather than flagged.
fn is_non_decreasing<'a>(ids: impl Iterator<Item = &'a str>) -> bool {
    let mut previous: Option<u64> = None;
    for id in ids {
        let Some(caps) = LEADING_INT.captures(id) else {
            continue;
        };
        let Ok(value) = caps[1].parse::<u64>() else {
            continue;
        };
        if let Some(prev) = previous {
            if value < prev {
                return false;
            }
        }
        previous = Some(value);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;
    use crate::types::{ActDocument, Article, Recital};
    use pretty_assertions::assert_eq;

    fn small_doc() -> (Element, ActDocument) {
        let root = parse_markup(
            "<html><body><p>EUROPEISKA RÅDET HAR ANTAGIT</p>\
             <p>Artikel 1 En regel.</p>\
             <p>Utfärdad i Bryssel.</p></body></html>",
        );
        let mut doc = ActDocument::new("32010R1234", Dialect::Transitional);
        doc.metadata.title = "En titel".to_string();
        doc.preamble.intro_text = "EUROPEISKA RÅDET HAR ANTAGIT".to_string();
        let mut article = Article::new("1");
        article.content.push("En regel.".to_string());
        doc.body.push(article);
        doc.final_provisions.append_text("Utfärdad i Bryssel.");
        (root, doc)
    }

    #[test]
    fn test_validate_ok() {
        let (root, doc) = small_doc();
        let row = validate(&root, &doc);
        assert_eq!(row.status, RowStatus::Ok);
        assert!(row.flags.is_empty());
        assert!(row.diff < LOSS_TOLERANCE_DEFAULT);
    }

    #[test]
    fn test_validate_flags_empty_body() {
        let (root, mut doc) = small_doc();
        doc.body.clear();
        let row = validate(&root, &doc);
        assert_eq!(row.status, RowStatus::Fail);
        assert!(row.flags.contains(&"EMPTY_BODY".to_string()));
    }

    #[test]
    fn test_validate_flags_missing_title() {
        let (root, mut doc) = small_doc();
        doc.metadata.title.clear();
        let row = validate(&root, &doc);
        assert!(row.flags.contains(&"MISSING_TITLE".to_string()));
    }

    #[test]
    fn test_validate_consolidated_allows_missing_sections() {
        let root = parse_markup("<html><body><p>Artikel 1 En regel.</p></body></html>");
        let mut doc = ActDocument::new("31990R0028", Dialect::ModernFlatConsolidated);
        doc.metadata.title = "En titel".to_string();
        let mut article = Article::new("1");
        article.content.push("En regel.".to_string());
        doc.body.push(article);

        let row = validate(&root, &doc);
        assert!(!row.flags.iter().any(|f| f == "EMPTY_PREAMBLE"));
        assert!(!row.flags.iter().any(|f| f == "MISSING_FINAL_PROVISIONS"));
    }

    #[test]
    fn test_validate_flags_high_data_loss() {
        let big = format!(
            "<html><body><p>{}</p></body></html>",
            "innehåll ".repeat(300)
        );
        let root = parse_markup(&big);
        let mut doc = ActDocument::new("32010R1234", Dialect::ModernEliOj);
        doc.metadata.title = "En titel".to_string();
        doc.preamble.intro_text = "intro".to_string();
        doc.body.push(Article::new("1"));
        doc.final_provisions.append_text("slut");

        let row = validate(&root, &doc);
        assert_eq!(row.status, RowStatus::Fail);
        assert!(row.flags.iter().any(|f| f.starts_with("HIGH_DATA_LOSS_")));
    }

    #[test]
    fn test_order_check() {
        let (root, mut doc) = small_doc();
        doc.body.push(Article::new("3"));
        doc.body.push(Article::new("2"));
        let row = validate(&root, &doc);
        assert!(row.flags.contains(&"ARTICLES_ORDER_ERR".to_string()));

        let (root, mut doc) = small_doc();
        doc.preamble.recitals.push(Recital {
            id: "2".to_string(),
            text: "a".to_string(),
            references: Vec::new(),
        });
        doc.preamble.recitals.push(Recital {
            id: "1".to_string(),
            text: "b".to_string(),
            references: Vec::new(),
        });
        let row = validate(&root, &doc);
        assert!(row.flags.contains(&"RECITALS_ORDER_ERR".to_string()));
    }

    #[test]
    fn test_order_check_accepts_letter_suffixes() {
        let (root, mut doc) = small_doc();
        doc.body.push(Article::new("14a"));
        doc.body.push(Article::new("14b"));
        doc.body.push(Article::new("15"));
        let row = validate(&root, &doc);
        assert!(!row.flags.iter().any(|f| f == "ARTICLES_ORDER_ERR"));
    }
}
