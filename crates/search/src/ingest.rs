//! JSON article ingestion
//!
//! Reads news-article JSON files into [`Document`]s. Recognized fields, all
//! optional:
//!
//! ```json
//! {
//!   "title": "...", "publication": "...", "date_published": "...",
//!   "text": "...",
//!   "authors": ["..."],
//!   "organizations": [{"name": "..."}],
//!   "persons": [{"name": "..."}]
//! }
//! ```
//!
//! List members may be plain strings or objects carrying a `name`. Unknown
//! fields and wrongly typed values are ignored.

use crate::tokenizer::Analyzer;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use supersearch_core::{Document, Error, Result, SearchConfig};
use tracing::{debug, info, warn};

const JSON_EXTENSION: &str = "json";

#[derive(Debug, Default, Deserialize)]
struct RawArticle {
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    publication: String,
    #[serde(default, deserialize_with = "lenient_string")]
    date_published: String,
    #[serde(default, deserialize_with = "lenient_string")]
    text: String,
    #[serde(default, deserialize_with = "name_list")]
    authors: Vec<String>,
    #[serde(default, deserialize_with = "name_list")]
    organizations: Vec<String>,
    #[serde(default, deserialize_with = "name_list")]
    persons: Vec<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn name_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Object(mut fields) => match fields.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        })
        .collect())
}

/// Builds documents from JSON article files
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    analyzer: Analyzer,
}

impl DocumentParser {
    /// Parser with the default analyzer
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser whose analyzer follows `config`
    pub fn from_config(config: &SearchConfig) -> Self {
        DocumentParser {
            analyzer: Analyzer::from_config(config),
        }
    }

    /// Builder: use a specific analyzer
    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// The analyzer producing processed text
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Build a document identified by `path` from JSON `content`.
    pub fn parse_str(&self, path: &str, content: &str) -> Result<Document> {
        let raw: RawArticle = serde_json::from_str(content)
            .map_err(|e| Error::InvalidDocument(format!("{}: {}", path, e)))?;
        let processed = self.analyzer.process(&raw.text);

        Ok(Document::builder(path)
            .title(raw.title)
            .publication(raw.publication)
            .date_published(raw.date_published)
            .text(raw.text)
            .processed_text(processed)
            .authors(raw.authors)
            .organizations(raw.organizations)
            .persons(raw.persons)
            .build())
    }

    /// Read and parse one JSON file.
    pub fn parse_document(&self, path: &Path) -> Result<Document> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&path.to_string_lossy(), &content)
    }

    /// Parse every `*.json` file under `dir`, recursively, in path order.
    ///
    /// Files that cannot be read or parsed are skipped with a warning. Fails
    /// only if `dir` itself cannot be read.
    pub fn parse_directory(&self, dir: &Path) -> Result<Vec<Document>> {
        let files = collect_json_files(dir)?;
        let mut documents = Vec::with_capacity(files.len());
        let mut skipped = 0usize;

        for file in &files {
            match self.parse_document(file) {
                Ok(doc) => {
                    debug!(path = %file.display(), "Parsed document");
                    documents.push(doc);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(path = %file.display(), error = %e, "Skipping unparsable document");
                }
            }
        }

        info!(
            dir = %dir.display(),
            parsed = documents.len(),
            skipped,
            "Parsed directory"
        );
        Ok(documents)
    }
}

fn collect_json_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    let mut is_root = true;

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if is_root => return Err(e.into()),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };
        is_root = false;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file()
                && path.extension().map_or(false, |ext| ext == JSON_EXTENSION)
            {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
