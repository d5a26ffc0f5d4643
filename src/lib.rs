//! SuperSearch - embedded full-text search over news-style JSON articles
//!
//! SuperSearch indexes articles by stemmed term, by organization and by
//! person, answers boolean queries with `ORG:` / `PERSON:` filters and
//! `-term` exclusions, and ranks matches by TF-IDF.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use supersearch::{DocumentParser, IndexEngine, QueryProcessor, SearchConfig};
//!
//! # fn main() -> supersearch::Result<()> {
//! let config = SearchConfig::from_file(Path::new("supersearch.toml"))?;
//! let mut engine = IndexEngine::new();
//! engine.index_directory("data/", &DocumentParser::from_config(&config))?;
//! engine.save_indices(&config.index_base_path);
//!
//! let processor = QueryProcessor::with_config(&engine, &config);
//! for doc in processor.process_top("rates ORG:Bank of Japan") {
//!     println!("{} ({})", doc.title(), doc.publication());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `supersearch-core`: documents, configuration, errors
//! - `supersearch-storage`: the AVL index map, posting lists, index file codec
//! - `supersearch-search`: analysis, ingestion, the engine and queries

pub use supersearch_core::{
    index_file_path, Document, DocumentBuilder, Error, Result, SearchConfig, CONFIG_FILE_NAME,
};
pub use supersearch_search::{
    Analyzer, DocumentParser, IndexEngine, ParsedQuery, QueryParser, QueryProcessor,
    ScoredDocument, Stemmer,
};
pub use supersearch_storage::{OrderedIndexMap, PostingList};
