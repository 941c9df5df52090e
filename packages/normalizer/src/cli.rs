//! Command-line interface for the normalizer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::classify::classify;
use crate::config::{DEFAULT_JSON_DIR, DEFAULT_LINK_LOG_FILE, DEFAULT_REPORT_FILE, DEFAULT_SOURCE_DIR};
use crate::error::{NormalizerError, Result};
use crate::markup::parse_markup;
use crate::pipeline::{
    extract_file, find_file_recursive, link_directory, link_file, process_directory,
};
use crate::report::{write_link_log, write_validation_report};
use crate::validate::RowStatus;

/// EurLex Normalizer - Structure and cross-link EU legislative acts.
#[derive(Parser)]
#[command(name = "eurlex-normalizer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report the dialect distribution of a directory of act files.
    Classify {
        /// Directory of markup files (default: data/eurlexacts/parsed)
        #[arg(short, long)]
        source_dir: Option<PathBuf>,
    },

    /// Extract acts into structured JSON and write a validation report.
    Extract {
        /// A file path or bare identifier; omit to process the whole directory
        target: Option<String>,

        /// Directory of markup files (default: data/eurlexacts/parsed)
        #[arg(short, long)]
        source_dir: Option<PathBuf>,

        /// Output directory for JSON documents (default: data/eurlexacts/json)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Validation report path (default: validation_report.csv)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Wrap citations in reference markers, rewriting files in place.
    Link {
        /// A file path or bare identifier; omit to process the whole directory
        target: Option<String>,

        /// Directory of markup files (default: data/eurlexacts/parsed)
        #[arg(short, long)]
        source_dir: Option<PathBuf>,

        /// Link change log path (default: link_processing.log)
        #[arg(short, long)]
        log: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { source_dir } => {
            classify_command(source_dir.as_deref().unwrap_or(Path::new(DEFAULT_SOURCE_DIR)))
        }
        Commands::Extract {
            target,
            source_dir,
            output_dir,
            report,
        } => extract_command(
            target.as_deref(),
            source_dir.as_deref().unwrap_or(Path::new(DEFAULT_SOURCE_DIR)),
            output_dir.as_deref().unwrap_or(Path::new(DEFAULT_JSON_DIR)),
            report.as_deref().unwrap_or(Path::new(DEFAULT_REPORT_FILE)),
        ),
        Commands::Link {
            target,
            source_dir,
            log,
        } => link_command(
            target.as_deref(),
            source_dir.as_deref().unwrap_or(Path::new(DEFAULT_SOURCE_DIR)),
            log.as_deref().unwrap_or(Path::new(DEFAULT_LINK_LOG_FILE)),
        ),
    }
}

/// Resolve a target argument: an existing path is used as-is, anything
/// else is searched for as a bare identifier under the source directory.
fn resolve_target(target: &str, source_dir: &Path) -> Result<PathBuf> {
    let direct = PathBuf::from(target);
    if direct.exists() {
        return Ok(direct);
    }
    find_file_recursive(source_dir, target)
        .ok_or_else(|| NormalizerError::FileNotFound(target.to_string()))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Execute the classify command.
fn classify_command(source_dir: &Path) -> Result<()> {
    println!(
        "{} {}",
        style("Classifying").bold(),
        style(source_dir.display()).cyan()
    );

    let pb = spinner("Scanning files...");
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total = 0usize;

    for path in markup_files(source_dir) {
        let source = std::fs::read_to_string(&path)?;
        let dialect = classify(&parse_markup(&source));
        *counts.entry(dialect.as_str()).or_insert(0) += 1;
        total += 1;
    }
    pb.finish_and_clear();

    println!();
    for (dialect, count) in &counts {
        println!("  {:<28} {}", dialect, style(count).green());
    }
    println!();
    println!("{} {} files", style("Total:").bold(), total);

    Ok(())
}

/// Execute the extract command.
fn extract_command(
    target: Option<&str>,
    source_dir: &Path,
    output_dir: &Path,
    report: &Path,
) -> Result<()> {
    if let Some(target) = target {
        let path = resolve_target(target, source_dir)?;
        println!(
            "{} {}",
            style("Extracting").bold(),
            style(path.display()).cyan()
        );

        let row = extract_file(&path, output_dir)?;
        println!("  Status: {}", style_status(row.status));
        if !row.flags.is_empty() {
            println!("  Flags: {}", style(row.flags.join("; ")).yellow());
        }
        println!(
            "{} {}",
            style("Saved to:").green().bold(),
            crate::config::json_output_path(output_dir, &row.celex).display()
        );
        return Ok(());
    }

    println!(
        "{} {}",
        style("Extracting").bold(),
        style(source_dir.display()).cyan()
    );

    let pb = spinner("Processing files...");
    let summary = process_directory(source_dir, output_dir)?;
    write_validation_report(report, &summary.rows)?;
    pb.finish_and_clear();

    println!();
    println!("  Processed: {}", summary.processed);
    println!("  OK:        {}", style(summary.ok).green());
    println!("  Warnings:  {}", style(summary.warnings).yellow());
    println!("  Skipped:   {}", summary.skipped);
    println!("  Crashes:   {}", style(summary.crashes).red());
    println!();
    println!(
        "{} {}",
        style("Report written to:").green().bold(),
        report.display()
    );

    Ok(())
}

/// Execute the link command.
fn link_command(target: Option<&str>, source_dir: &Path, log: &Path) -> Result<()> {
    if let Some(target) = target {
        let path = resolve_target(target, source_dir)?;
        println!(
            "{} {}",
            style("Linking").bold(),
            style(path.display()).cyan()
        );

        let outcome = link_file(&path)?;
        println!(
            "  Result: +{} created, -{} removed",
            style(outcome.created).green(),
            style(outcome.removed).yellow()
        );
        print_suspects(outcome.suspects.iter().map(|c| ("-".to_string(), c.clone())));
        return Ok(());
    }

    println!(
        "{} {}",
        style("Linking").bold(),
        style(source_dir.display()).cyan()
    );

    let pb = spinner("Processing files...");
    let summary = link_directory(source_dir)?;
    write_link_log(log, &summary.entries)?;
    pb.finish_and_clear();

    println!();
    println!("  Processed:      {}", summary.processed);
    println!("  Modified:       {}", summary.files_modified);
    println!("  Links created:  {}", style(summary.created).green());
    println!("  Links removed:  {}", style(summary.removed).yellow());
    print_suspects(summary.suspects.into_iter());
    println!();
    println!(
        "{} {}",
        style("Log written to:").green().bold(),
        log.display()
    );

    Ok(())
}

fn print_suspects(suspects: impl Iterator<Item = (String, String)>) {
    let suspects: Vec<(String, String)> = suspects.collect();
    if suspects.is_empty() {
        return;
    }
    println!();
    println!(
        "{} {} suspect identifier(s)",
        style("Warning:").yellow().bold(),
        suspects.len()
    );
    for (file, celex) in suspects {
        println!("  {:<35} {}", file, style(celex).yellow());
    }
}

fn style_status(status: RowStatus) -> console::StyledObject<&'static str> {
    match status {
        RowStatus::Ok => style("OK").green(),
        RowStatus::Fail => style("FAIL").yellow(),
        RowStatus::Skip => style("SKIP").dim(),
        RowStatus::Crash => style("CRASH").red(),
    }
}

fn markup_files(source_dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(source_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| crate::config::is_markup_file(path))
        .collect()
}
