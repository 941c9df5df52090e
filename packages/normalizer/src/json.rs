//! JSON output for extracted documents.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::json_output_path;
use crate::error::Result;
use crate::types::ActDocument;

/// Top-level shape of an output file.
#[derive(Serialize)]
struct DocumentFile<'a> {
    document: &'a ActDocument,
}

/// Write one document as pretty-printed JSON, creating the output
/// directory as needed. Returns the path written.
pub fn save_json(doc: &ActDocument, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = json_output_path(output_dir, &doc.metadata.celex);
    let json = serde_json::to_string_pretty(&DocumentFile { document: doc })?;
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActDocument, Article, Dialect};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = ActDocument::new("32010R1234", Dialect::ModernEliOj);
        doc.metadata.title = "En förordning".to_string();
        doc.body.push(Article::new("1"));

        let path = save_json(&doc, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "32010R1234.json");

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["document"]["metadata"]["celex"], "32010R1234");
        assert_eq!(value["document"]["metadata"]["original_format"], "modern_eli");
        assert_eq!(value["document"]["body"][0]["type"], "article");
    }

    #[test]
    fn test_save_json_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ActDocument::new("31971R1408", Dialect::LegacyConfirmed);
        let nested = dir.path().join("a/b");
        let path = save_json(&doc, &nested).unwrap();
        assert!(path.exists());
    }
}
