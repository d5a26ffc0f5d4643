//! Error types for SuperSearch
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Most data-shape problems are not errors at the query surface: absent keys
//! produce empty results and malformed persisted lines are skipped. The
//! variants below cover the cases where a caller asked for a signal.

use std::io;
use thiserror::Error;

/// Result type alias for SuperSearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SuperSearch
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (index files, config files, article files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A persisted index line could not be decoded
    #[error("Corrupt index line {line}: {reason}")]
    Corruption {
        /// 1-based line number in the index file
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration could not be read or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// An ingested document was missing required data
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl Error {
    /// Build a corruption error for the given line
    pub fn corruption(line: usize, reason: impl Into<String>) -> Self {
        Error::Corruption {
            line,
            reason: reason.into(),
        }
    }

    /// Whether this error came from the file system
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
