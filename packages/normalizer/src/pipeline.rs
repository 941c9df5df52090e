//! Batch drivers.
//!
//! Single-file operations return their result directly; the directory
//! drivers fan out over all markup files with rayon, convert per-file
//! errors into report rows, and reduce everything into a run summary. No
//! shared mutable state: each file produces one value and the reduction
//! happens after the parallel section.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::classify;
use crate::config::{celex_from_path, is_markup_file, validate_celex_id, MARKUP_EXTENSIONS};
use crate::error::{NormalizerError, Result};
use crate::extract::extract_document;
use crate::json::save_json;
use crate::linker::{link_tree, LinkOutcome};
use crate::markup::{parse_markup, to_markup};
use crate::report::LinkLogEntry;
use crate::types::Dialect;
use crate::validate::{validate, ReportRow, RowStatus};

/// Aggregate result of a batch extraction run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub ok: usize,
    pub warnings: usize,
    pub skipped: usize,
    pub crashes: usize,
    pub rows: Vec<ReportRow>,
}

impl RunSummary {
    fn from_rows(rows: Vec<ReportRow>) -> Self {
        let mut summary = Self {
            processed: rows.len(),
            ..Self::default()
        };
        for row in &rows {
            match row.status {
                RowStatus::Ok => summary.ok += 1,
                RowStatus::Fail => summary.warnings += 1,
                RowStatus::Skip => summary.skipped += 1,
                RowStatus::Crash => summary.crashes += 1,
            }
        }
        summary.rows = rows;
        summary
    }
}

/// Aggregate result of a batch linking run.
#[derive(Debug, Default)]
pub struct LinkSummary {
    pub processed: usize,
    pub files_modified: usize,
    pub created: usize,
    pub removed: usize,

    /// `(file name, identifier)` pairs for citations that resolved outside
    /// the plausible range.
    pub suspects: Vec<(String, String)>,

    /// One entry per modified file, in processing order.
    pub entries: Vec<LinkLogEntry>,
}

/// Extract one markup file into a JSON document and validate it.
pub fn extract_file(path: &Path, output_dir: &Path) -> Result<ReportRow> {
    let source = fs::read_to_string(path)?;
    let celex = celex_from_path(path);
    validate_celex_id(&celex)?;
    debug!(file = %path.display(), "extracting");

    let root = parse_markup(&source);
    let dialect = classify(&root);
    let doc = extract_document(&root, &celex, dialect)?;
    let row = validate(&root, &doc);
    save_json(&doc, output_dir)?;
    Ok(row)
}

/// Extract every markup file under a directory.
pub fn process_directory(source_dir: &Path, output_dir: &Path) -> Result<RunSummary> {
    let files = collect_markup_files(source_dir);
    let rows: Vec<ReportRow> = files
        .par_iter()
        .map(|path| match extract_file(path, output_dir) {
            Ok(row) => row,
            Err(NormalizerError::ClassificationGap { celex }) => {
                debug!(file = %path.display(), "no dialect rule matched, skipping");
                ReportRow::skipped(celex)
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "extraction crashed");
                ReportRow::crashed(celex_from_path(path), Dialect::Uncategorized, err.to_string())
            }
        })
        .collect();

    Ok(RunSummary::from_rows(rows))
}

/// Link citations in one file, rewriting it only when the tree changed.
pub fn link_file(path: &Path) -> Result<LinkOutcome> {
    let source = fs::read_to_string(path)?;
    let mut root = parse_markup(&source);
    let outcome = link_tree(&mut root);
    if outcome.changed() {
        fs::write(path, to_markup(&root))?;
    }
    Ok(outcome)
}

/// Link citations in every markup file under a directory.
pub fn link_directory(source_dir: &Path) -> Result<LinkSummary> {
    let files = collect_markup_files(source_dir);
    let results: Vec<(PathBuf, Result<LinkOutcome>)> = files
        .into_par_iter()
        .map(|path| {
            let outcome = link_file(&path);
            (path, outcome)
        })
        .collect();

    let mut summary = LinkSummary::default();
    for (path, result) in results {
        summary.processed += 1;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "linking failed");
                continue;
            }
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        for celex in &outcome.suspects {
            summary.suspects.push((file_name.clone(), celex.clone()));
        }

        if outcome.changed() {
            summary.files_modified += 1;
            summary.created += outcome.created;
            summary.removed += outcome.removed;
            summary.entries.push(LinkLogEntry {
                path,
                created: outcome.created,
                removed: outcome.removed,
            });
        }
    }

    Ok(summary)
}

/// Resolve a bare identifier to a file under the source tree, trying the
/// known markup extensions.
pub fn find_file_recursive(base_dir: &Path, name: &str) -> Option<PathBuf> {
    let mut candidates = vec![name.to_string()];
    for ext in MARKUP_EXTENSIONS {
        candidates.push(format!("{name}.{ext}"));
    }

    WalkDir::new(base_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .find(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|f| candidates.iter().any(|c| c == f))
        })
        .map(walkdir::DirEntry::into_path)
}

fn collect_markup_files(source_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(source_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_markup_file(path))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ELI_ACT: &str = r#"<html><body><div class="eli-container">
        <p class="oj-doc-ti">Europaparlamentets och rådets förordning (EU) nr 1234/2010</p>
        <div id="pbl_1">
           <p class="oj-normal">EUROPAPARLAMENTET HAR ANTAGIT DENNA FÖRORDNING</p>
           <table id="rct_1"><tr><td>(1)</td><td>Första skälet.</td></tr></table>
        </div>
        <div id="art_1" class="eli-subdivision">
           <p class="oj-ti-art">Artikel 1</p>
           <p class="oj-normal">Denna förordning gäller enligt direktiv 96/34/EG.</p>
        </div>
        <div id="fnp_1">
           <p class="oj-normal">Denna förordning träder i kraft.</p>
        </div>
        </div></body></html>"#;

    #[test]
    fn test_extract_file_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("32010R1234.xhtml");
        fs::write(&source, ELI_ACT).unwrap();
        let out = dir.path().join("json");

        let row = extract_file(&source, &out).unwrap();
        assert_eq!(row.celex, "32010R1234");
        assert!(out.join("32010R1234.json").exists());
    }

    #[test]
    fn test_process_directory_isolates_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("32010R1234.xhtml"), ELI_ACT).unwrap();
        fs::write(
            dir.path().join("32011R0001.xhtml"),
            "<html><body><p>inga strukturmarkörer</p></body></html>",
        )
        .unwrap();
        fs::write(dir.path().join("felnamn.xhtml"), ELI_ACT).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let out = dir.path().join("json");

        let summary = process_directory(dir.path(), &out).unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.crashes, 1);
        assert!(out.join("32010R1234.json").exists());
        assert!(!out.join("32011R0001.json").exists());
        assert!(!out.join("felnamn.json").exists());
    }

    #[test]
    fn test_extract_file_rejects_malformed_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("inte-ett-celexid.xhtml");
        fs::write(&source, ELI_ACT).unwrap();

        let err = extract_file(&source, &dir.path().join("json")).unwrap_err();
        assert!(matches!(err, NormalizerError::InvalidCelexId(_)));
    }

    #[test]
    fn test_link_file_rewrites_only_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("32010R1234.xhtml");
        fs::write(&path, "<html><body><p>Se direktiv 96/34/EG.</p></body></html>").unwrap();

        let first = link_file(&path).unwrap();
        assert_eq!(first.created, 1);
        let linked = fs::read_to_string(&path).unwrap();
        assert!(linked.contains("celex-ref"));
        assert!(linked.contains("31996L0034"));

        let second = link_file(&path).unwrap();
        assert!(!second.changed());
        assert_eq!(fs::read_to_string(&path).unwrap(), linked);
    }

    #[test]
    fn test_find_file_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        let target = nested.join("31971R1408.xhtml");
        fs::write(&target, "<html/>").unwrap();

        assert_eq!(find_file_recursive(dir.path(), "31971R1408"), Some(target));
        assert_eq!(find_file_recursive(dir.path(), "39999R9999"), None);
    }
}
