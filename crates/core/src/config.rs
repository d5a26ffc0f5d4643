//! Search configuration via `supersearch.toml`
//!
//! A small TOML file controls where index files live and how text is
//! normalized. Missing keys fall back to defaults, so an empty file is a
//! valid configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "supersearch.toml";

/// Suffix of the term index file
pub const TERMS_SUFFIX: &str = "_terms";
/// Suffix of the organization index file
pub const ORGS_SUFFIX: &str = "_orgs";
/// Suffix of the person index file
pub const PERSONS_SUFFIX: &str = "_persons";
/// Suffix of the document store file, one line per indexed path
pub const DOCS_SUFFIX: &str = "_docs";
/// Extension appended after the suffix
pub const INDEX_EXTENSION: &str = "idx";

/// Configuration loaded from `supersearch.toml`.
///
/// # Example
///
/// ```toml
/// index_base_path = "index.dat"
/// max_results = 15
/// remove_stop_words = true
/// min_token_len = 1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Base path that index file suffixes are appended to
    #[serde(default = "default_index_base_path")]
    pub index_base_path: String,
    /// Number of results returned by a top-N query
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Drop stop words while normalizing text
    #[serde(default = "default_true")]
    pub remove_stop_words: bool,
    /// Tokens shorter than this (in chars) are dropped while normalizing
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
}

fn default_index_base_path() -> String {
    "index.dat".to_string()
}

fn default_max_results() -> usize {
    15
}

fn default_true() -> bool {
    true
}

fn default_min_token_len() -> usize {
    1
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_base_path: default_index_base_path(),
            max_results: default_max_results(),
            remove_stop_words: true,
            min_token_len: default_min_token_len(),
        }
    }
}

impl SearchConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# SuperSearch configuration
#
# Index files are written as <base>_terms.idx, <base>_orgs.idx, <base>_persons.idx
index_base_path = "index.dat"

# Number of ranked results shown per query
max_results = 15

# Drop common English words before stemming
remove_stop_words = true

# Drop tokens shorter than this many characters
min_token_len = 1
"#
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would make queries return nothing
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(Error::Config("max_results must be at least 1".to_string()));
        }
        if self.index_base_path.trim().is_empty() {
            return Err(Error::Config("index_base_path must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Path of one index file: `<base><suffix>.idx`
pub fn index_file_path(base: &str, suffix: &str) -> String {
    format!("{}{}.{}", base, suffix, INDEX_EXTENSION)
}
