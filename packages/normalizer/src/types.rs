//! Core data types for the normalizer.
//!
//! These types form the canonical structured record produced from one act
//! markup file, regardless of which publishing dialect it arrived in. The
//! record is built once per source file and is immutable after extraction.

use serde::{Deserialize, Serialize};

/// The closed set of structural dialects an act file can be published in.
///
/// Tag strings match the `original_format` values used in the JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Modern Official Journal publication with nested ELI containers.
    #[serde(rename = "modern_eli")]
    ModernEliOj,

    /// ELI containers plus a consolidation disclaimer.
    ModernEliConsolidated,

    /// Consolidated text with flat article headers, no ELI nesting.
    ModernFlatConsolidated,

    /// Older consolidated files styled with inline CSS.
    ConsolidatedInline,

    /// Format used between the legacy era and ELI adoption.
    Transitional,

    /// The oldest format: a single full-text container with no
    /// semantic markup at all.
    #[serde(rename = "legacy")]
    LegacyConfirmed,

    /// No known structural trigger matched. Extraction is skipped.
    Uncategorized,
}

impl Dialect {
    /// String tag used in metadata and report rows.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModernEliOj => "modern_eli",
            Self::ModernEliConsolidated => "modern_eli_consolidated",
            Self::ModernFlatConsolidated => "modern_flat_consolidated",
            Self::ConsolidatedInline => "consolidated_inline",
            Self::Transitional => "transitional",
            Self::LegacyConfirmed => "legacy",
            Self::Uncategorized => "uncategorized",
        }
    }

    /// Consolidated dialects legitimately lack a preamble and final
    /// provisions, and may drop large amendment-history tables.
    #[must_use]
    pub fn is_consolidated(&self) -> bool {
        matches!(
            self,
            Self::ModernEliConsolidated | Self::ModernFlatConsolidated | Self::ConsolidatedInline
        )
    }
}

/// A resolved cross-citation found in some text span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Canonical identifier of the cited act.
    pub celex: String,

    /// Article fragment within the cited act (e.g., "3", "3a").
    #[serde(default)]
    pub article: Option<String>,
}

impl Reference {
    /// Create a reference to a whole act.
    #[must_use]
    pub fn new(celex: impl Into<String>) -> Self {
        Self {
            celex: celex.into(),
            article: None,
        }
    }

    /// Create a reference pointing at a specific article.
    #[must_use]
    pub fn with_article(mut self, article: impl Into<String>) -> Self {
        self.article = Some(article.into());
        self
    }
}

/// Document metadata, partly derived from the filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Canonical identifier, derived from the filename. Immutable.
    pub celex: String,

    /// Act title.
    pub title: String,

    /// Publication date, when the source records one.
    pub date_published: String,

    /// Language tag of this edition.
    pub language: String,

    /// Dialect the source file was classified as.
    pub original_format: Dialect,
}

/// A numbered preamble clause stating legislative rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recital {
    pub id: String,
    pub text: String,
    pub references: Vec<Reference>,
}

/// Preamble: intro text plus enumerated recitals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preamble {
    pub intro_text: String,
    pub recitals: Vec<Recital>,
}

/// A single operative article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Discriminator kept for JSON-shape compatibility.
    #[serde(rename = "type")]
    pub kind: ArticleKind,

    /// Article number (e.g., "1", "14a").
    pub id: String,

    /// Optional subtitle printed under the article header.
    pub title: Option<String>,

    /// Paragraph texts in source order.
    pub content: Vec<String>,

    /// References found within this article.
    pub references: Vec<Reference>,
}

/// Tag value for body elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleKind {
    Article,
}

impl Article {
    /// Create an empty article with the given number.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            kind: ArticleKind::Article,
            id: id.into(),
            title: None,
            content: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// A trailing structured appendix to an act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annex {
    pub id: String,
    pub title: String,
    pub content: Vec<String>,
    pub references: Vec<Reference>,
}

impl Annex {
    /// Create an empty annex with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            content: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// Closing section: enacting formula text and signature lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalProvisions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signatures: Option<Vec<String>>,
}

impl FinalProvisions {
    /// Append a line to the provisions text, space-joined.
    pub fn append_text(&mut self, line: &str) {
        match &mut self.text {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(line);
            }
            None => self.text = Some(line.to_string()),
        }
    }

    /// Record a signature line.
    pub fn push_signature(&mut self, line: impl Into<String>) {
        self.signatures.get_or_insert_with(Vec::new).push(line.into());
    }
}

/// Canonical structured record for one act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActDocument {
    pub metadata: Metadata,
    pub preamble: Preamble,
    pub body: Vec<Article>,
    pub annexes: Vec<Annex>,
    pub final_provisions: FinalProvisions,
}

impl ActDocument {
    /// Create an empty document for the given identifier and dialect.
    #[must_use]
    pub fn new(celex: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            metadata: Metadata {
                celex: celex.into(),
                title: String::new(),
                date_published: String::new(),
                language: crate::config::DOCUMENT_LANGUAGE.to_string(),
                original_format: dialect,
            },
            preamble: Preamble::default(),
            body: Vec::new(),
            annexes: Vec::new(),
            final_provisions: FinalProvisions::default(),
        }
    }
}
