//! Search layer for SuperSearch
//!
//! This crate provides:
//! - Stemmer: Porter-style suffix stripping
//! - Analyzer: punctuation cleanup, stop words and stemming
//! - DocumentParser: JSON articles into documents
//! - IndexEngine: term/organization/person indices, boolean evaluation, TF-IDF ranking
//! - QueryParser / QueryProcessor: query syntax and evaluation
//!
//! # Usage
//!
//! ```
//! use supersearch_core::Document;
//! use supersearch_search::{IndexEngine, QueryProcessor};
//!
//! let mut engine = IndexEngine::new();
//! engine.add_document(Document::builder("a.json").processed_text("bank rate").build());
//! engine.add_document(Document::builder("b.json").processed_text("bank").build());
//!
//! let results = QueryProcessor::new(&engine).process("banks -rates");
//! assert_eq!(results[0].path(), "b.json");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod ingest;
pub mod query;
pub mod stemmer;
pub mod tokenizer;

// Re-export commonly used types
pub use engine::{IndexEngine, ScoredDocument};
pub use ingest::DocumentParser;
pub use query::{ParsedQuery, QueryParser, QueryProcessor};
pub use stemmer::{stem, Stemmer};
pub use tokenizer::{clean_text, Analyzer, StopWords};
