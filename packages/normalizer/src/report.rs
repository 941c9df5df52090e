//! Report writers.
//!
//! Two artifacts per batch run: the validation report (CSV, one row per
//! source file) and the link change log (semicolon-separated, one row per
//! modified file).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::validate::ReportRow;

/// One line of the link change log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkLogEntry {
    pub path: PathBuf,
    pub created: usize,
    pub removed: usize,
}

/// Write the validation report.
pub fn write_validation_report(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "celex,parser,status,original_len,json_len,diff,flags")?;
    for row in rows {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            csv_field(&row.celex),
            row.dialect.as_str(),
            row.status.as_str(),
            row.original_len,
            row.json_len,
            row.diff,
            csv_field(&row.flags.join("; ")),
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Write the link change log. Only modified files get a row.
pub fn write_link_log(path: &Path, entries: &[LinkLogEntry]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "FIL;SKAPADE;BORTTAGNA")?;
    for entry in entries {
        writeln!(
            out,
            "{};{};{}",
            entry.path.display(),
            entry.created,
            entry.removed
        )?;
    }
    out.flush()?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
