//! End-to-end integration tests for the normalizer pipeline.
//!
//! The fixture directory holds one small act per publishing dialect plus
//! one file no classification rule matches. Tests stage the fixtures into a
//! temporary directory, since the linker rewrites files in place.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

use eurlex_normalizer::classify::classify;
use eurlex_normalizer::markup::parse_markup;
use eurlex_normalizer::pipeline::{link_directory, link_file, process_directory};
use eurlex_normalizer::types::Dialect;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("acts")
}

/// Copy the fixture acts into a writable directory.
fn stage_fixtures(dir: &Path) {
    for entry in fs::read_dir(fixture_dir()).expect("fixture dir") {
        let entry = entry.expect("fixture entry");
        fs::copy(entry.path(), dir.join(entry.file_name())).expect("copy fixture");
    }
}

fn load_json(dir: &Path, celex: &str) -> serde_json::Value {
    let raw = fs::read_to_string(dir.join(format!("{celex}.json")))
        .unwrap_or_else(|e| panic!("missing {celex}.json: {e}"));
    serde_json::from_str(&raw).expect("valid JSON")
}

#[test]
fn test_fixture_classification() {
    let expected = [
        ("32010R1234", Dialect::ModernEliOj),
        ("31990R0028", Dialect::ModernFlatConsolidated),
        ("31990R0737", Dialect::ConsolidatedInline),
        ("31996L0034", Dialect::Transitional),
        ("31971R1408", Dialect::LegacyConfirmed),
        ("31999C0042", Dialect::Uncategorized),
    ];
    for (celex, dialect) in expected {
        let source = fs::read_to_string(fixture_dir().join(format!("{celex}.xhtml"))).unwrap();
        assert_eq!(classify(&parse_markup(&source)), dialect, "{celex}");
    }
}

#[test]
fn test_batch_extraction_summary() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("json");

    let summary = process_directory(&fixture_dir(), &out).unwrap();

    assert_eq!(summary.processed, 6);
    assert_eq!(summary.ok, 5, "rows: {:?}", summary.rows);
    assert_eq!(summary.warnings, 0, "rows: {:?}", summary.rows);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.crashes, 0);

    for celex in [
        "32010R1234",
        "31990R0028",
        "31990R0737",
        "31996L0034",
        "31971R1408",
    ] {
        assert!(out.join(format!("{celex}.json")).exists(), "{celex}");
    }
    assert!(!out.join("31999C0042.json").exists());
}

#[test]
fn test_eli_document_structure() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("json");
    process_directory(&fixture_dir(), &out).unwrap();

    let doc = load_json(&out, "32010R1234");
    let document = &doc["document"];

    assert_eq!(document["metadata"]["celex"], "32010R1234");
    assert_eq!(document["metadata"]["language"], "SV");
    assert_eq!(document["metadata"]["original_format"], "modern_eli");
    assert!(document["metadata"]["title"]
        .as_str()
        .unwrap()
        .contains("1234/2010"));

    let recitals = document["preamble"]["recitals"].as_array().unwrap();
    assert_eq!(recitals.len(), 2);
    assert_eq!(recitals[0]["id"], "1");

    let body = document["body"].as_array().unwrap();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["type"], "article");
    assert_eq!(body[0]["id"], "1");
    assert_eq!(body[0]["title"], "Syfte");

    let annexes = document["annexes"].as_array().unwrap();
    assert_eq!(annexes.len(), 1);
    assert_eq!(annexes[0]["id"], "I");

    assert!(document["final_provisions"]["text"]
        .as_str()
        .unwrap()
        .contains("träder i kraft"));
}

#[test]
fn test_legacy_document_structure() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("json");
    process_directory(&fixture_dir(), &out).unwrap();

    let doc = load_json(&out, "31971R1408");
    let document = &doc["document"];

    assert_eq!(document["metadata"]["original_format"], "legacy");
    assert!(document["metadata"]["title"]
        .as_str()
        .unwrap()
        .contains("1408/71"));
    assert_eq!(document["metadata"]["date_published"], "1971-07-05");

    assert_eq!(document["preamble"]["recitals"].as_array().unwrap().len(), 2);

    let body = document["body"].as_array().unwrap();
    assert_eq!(body.len(), 2);
    assert!(body[0]["content"][0]
        .as_str()
        .unwrap()
        .starts_with("I denna förordning"));

    let signatures = document["final_provisions"]["signatures"]
        .as_array()
        .unwrap();
    assert_eq!(signatures.len(), 2);
}

#[test]
fn test_link_batch_then_extract_references() {
    let tmp = tempfile::tempdir().unwrap();
    stage_fixtures(tmp.path());

    let summary = link_directory(tmp.path()).unwrap();
    assert_eq!(summary.processed, 6);
    assert_eq!(summary.files_modified, 4);
    assert!(summary.created >= 4);
    assert_eq!(summary.removed, 0);
    assert!(summary.suspects.is_empty(), "{:?}", summary.suspects);

    let linked = fs::read_to_string(tmp.path().join("32010R1234.xhtml")).unwrap();
    assert!(linked.contains("celex-ref"));
    assert!(linked.contains("res/eurlexacts/31971R1408"));

    // Extraction after linking picks the markers up as references.
    let out = tmp.path().join("json");
    process_directory(tmp.path(), &out).unwrap();

    let doc = load_json(&out, "32010R1234");
    let references = doc["document"]["body"][0]["references"].as_array().unwrap();
    assert_eq!(references.len(), 1);
    assert_eq!(references[0]["celex"], "31971R1408");

    let doc = load_json(&out, "31990R0028");
    let references = doc["document"]["body"][1]["references"].as_array().unwrap();
    assert_eq!(references[0]["celex"], "31996L0034");
}

#[test]
fn test_link_batch_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    stage_fixtures(tmp.path());

    let first = link_directory(tmp.path()).unwrap();
    assert!(first.created > 0);

    let snapshot: Vec<(PathBuf, String)> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            let content = fs::read_to_string(&path).unwrap();
            (path, content)
        })
        .collect();

    let second = link_directory(tmp.path()).unwrap();
    assert_eq!(second.files_modified, 0);
    assert_eq!(second.created, 0);
    assert_eq!(second.removed, 0);

    for (path, before) in snapshot {
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}

#[test]
fn test_single_file_link_counts() {
    let tmp = tempfile::tempdir().unwrap();
    stage_fixtures(tmp.path());

    let outcome = link_file(&tmp.path().join("31990R0737.xhtml")).unwrap();
    // Title citation plus the reference inside article 1.
    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.removed, 0);
}

#[test]
fn test_cli_extract_single_file() {
    let tmp = tempfile::tempdir().unwrap();
    stage_fixtures(tmp.path());
    let out = tmp.path().join("json");

    let mut cmd = Command::cargo_bin("eurlex-normalizer").unwrap();
    cmd.arg("extract")
        .arg(tmp.path().join("31996L0034.xhtml"))
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to"));

    assert!(out.join("31996L0034.json").exists());
}

#[test]
fn test_cli_classify_directory() {
    let tmp = tempfile::tempdir().unwrap();
    stage_fixtures(tmp.path());

    let mut cmd = Command::cargo_bin("eurlex-normalizer").unwrap();
    cmd.arg("classify")
        .arg("--source-dir")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("modern_eli"))
        .stdout(predicate::str::contains("legacy"))
        .stdout(predicate::str::contains("6 files"));
}

#[test]
fn test_cli_extract_unknown_identifier_fails() {
    let tmp = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("eurlex-normalizer").unwrap();
    cmd.arg("extract")
        .arg("39999R9999")
        .arg("--source-dir")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("39999R9999"));
}
