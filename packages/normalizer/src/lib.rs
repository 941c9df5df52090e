//! EurLex Normalizer - structure and cross-link EU legislative acts.
//!
//! The corpus is a directory of act files in whichever markup dialect the
//! Official Journal published them in, from modern ELI-annotated XHTML down
//! to legacy single-container text dumps. This crate classifies each file,
//! extracts it into one canonical JSON document, validates the result
//! against the source, and injects resolvable cross-reference markers into
//! the markup itself.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod json;
pub mod linker;
pub mod markup;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod validate;

pub use error::{NormalizerError, Result};
pub use types::{ActDocument, Dialect};
