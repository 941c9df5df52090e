//! Configuration constants and validation functions for the normalizer.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{NormalizerError, Result};

/// Default directory holding the raw markup files, one per act.
pub const DEFAULT_SOURCE_DIR: &str = "data/eurlexacts/parsed";

/// Default directory for extracted JSON documents.
pub const DEFAULT_JSON_DIR: &str = "data/eurlexacts/json";

/// Default path for the tabular validation report.
pub const DEFAULT_REPORT_FILE: &str = "validation_report.csv";

/// Default path for the link change log.
pub const DEFAULT_LINK_LOG_FILE: &str = "link_processing.log";

/// Base URI that injected reference markers point into.
///
/// The local act repository serves documents under this prefix; extractors
/// recognize previously-injected markers by it.
pub const REFERENCE_URI_BASE: &str = "http://localhost:8000/res/eurlexacts";

/// File extensions treated as act markup.
pub const MARKUP_EXTENSIONS: &[&str] = &["xhtml", "html", "xml"];

/// Language tag recorded in extracted metadata. The corpus is the Swedish
/// edition of the Official Journal.
pub const DOCUMENT_LANGUAGE: &str = "SV";

/// CELEX sector-3 pattern: "3", 4-digit year, act-type letter, 4-digit sequence.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CELEX_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^3\d{4}[RLC]\d{4}$").expect("valid regex"));

/// Validate a canonical act identifier.
///
/// # Examples
/// ```
/// use eurlex_normalizer::config::validate_celex_id;
///
/// assert!(validate_celex_id("32010R1234").is_ok());
/// assert!(validate_celex_id("INVALID").is_err());
/// ```
pub fn validate_celex_id(celex: &str) -> Result<()> {
    if CELEX_ID_PATTERN.is_match(celex) {
        Ok(())
    } else {
        Err(NormalizerError::InvalidCelexId(celex.to_string()))
    }
}

/// Check whether a path looks like an act markup file.
pub fn is_markup_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MARKUP_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Derive the act identifier from a markup file path (the file stem).
pub fn celex_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Build the JSON output path for an extracted document.
pub fn json_output_path(output_dir: &Path, celex: &str) -> PathBuf {
    output_dir.join(format!("{celex}.json"))
}
