//! Error types for the normalizer.
//!
//! Per-file failures are isolated at the file boundary: the batch drivers
//! catch these errors, record them in the run summary, and keep going.

use thiserror::Error;

/// Main error type for the normalizer library.
#[derive(Debug, Error)]
pub enum NormalizerError {
    /// Invalid CELEX identifier format.
    #[error("Invalid CELEX identifier: '{0}'. Expected 3YYYYLNNNN (e.g., 32010R1234)")]
    InvalidCelexId(String),

    /// No classification rule matched the document tree.
    ///
    /// Extraction is skipped for such files; they need manual triage.
    #[error("No dialect rule matched for {celex}")]
    ClassificationGap { celex: String },

    /// A dialect strategy hit a tree shape it cannot handle.
    #[error("Extraction failed for {celex}: {detail}")]
    Extraction { celex: String, detail: String },

    /// File lookup by bare identifier found nothing.
    #[error("No file found for identifier '{0}'")]
    FileNotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// Result type alias for normalizer operations.
pub type Result<T> = std::result::Result<T, NormalizerError>;
