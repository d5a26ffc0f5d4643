//! Core types for SuperSearch
//!
//! This crate defines the foundational types used throughout the system:
//! - Document: one ingested article with metadata and term counts
//! - SearchConfig: settings loaded from `supersearch.toml`
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod error;

pub use config::{
    index_file_path, SearchConfig, CONFIG_FILE_NAME, DOCS_SUFFIX, ORGS_SUFFIX, PERSONS_SUFFIX,
    TERMS_SUFFIX,
};
pub use document::{Document, DocumentBuilder};
pub use error::{Error, Result};
