//! Query parsing and evaluation
//!
//! Query syntax, whitespace separated:
//! - `word`: required term, lowercased and stemmed like indexed text
//! - `-word`: excluded term, lowercased and stemmed
//! - `ORG:<name words...>`: required organization
//! - `PERSON:<name words...>`: required person
//!
//! An organization or person name runs until the next `ORG:`, `PERSON:` or
//! `-word` token, so `ORG:Bank of Japan rates` filters on the organization
//! "Bank of Japan rates". Put plain terms before the filters.

use crate::engine::{IndexEngine, ScoredDocument};
use crate::stemmer::Stemmer;
use std::sync::Arc;
use supersearch_core::{Document, SearchConfig};
use tracing::debug;

const ORG_PREFIX: &str = "ORG:";
const PERSON_PREFIX: &str = "PERSON:";

/// The four components of a parsed query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Stemmed terms every result must contain
    pub terms: Vec<String>,
    /// Stemmed terms no result may contain
    pub excluded_terms: Vec<String>,
    /// Organizations every result must mention
    pub organizations: Vec<String>,
    /// Persons every result must mention
    pub persons: Vec<String>,
}

impl ParsedQuery {
    /// True when the query has no components at all
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
            && self.excluded_terms.is_empty()
            && self.organizations.is_empty()
            && self.persons.is_empty()
    }
}

/// Open `ORG:` / `PERSON:` name being collected
enum Pending {
    None,
    Organization(Vec<String>),
    Person(Vec<String>),
}

impl Pending {
    fn flush_into(&mut self, query: &mut ParsedQuery) {
        match std::mem::replace(self, Pending::None) {
            Pending::None => {}
            Pending::Organization(words) => push_name(&mut query.organizations, words),
            Pending::Person(words) => push_name(&mut query.persons, words),
        }
    }
}

fn push_name(names: &mut Vec<String>, words: Vec<String>) {
    let name = words.join(" ");
    if !name.is_empty() {
        names.push(name);
    }
}

fn start_name(rest: &str) -> Vec<String> {
    if rest.is_empty() {
        Vec::new()
    } else {
        vec![rest.to_string()]
    }
}

/// Splits query strings into a [`ParsedQuery`]
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    stemmer: Stemmer,
}

impl QueryParser {
    /// Create a parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `input`. Each call starts from an empty query.
    ///
    /// # Example
    ///
    /// ```
    /// use supersearch_search::query::QueryParser;
    ///
    /// let q = QueryParser::new().parse("banks -rates ORG:Bank of Japan");
    /// assert_eq!(q.terms, vec!["bank"]);
    /// assert_eq!(q.excluded_terms, vec!["rate"]);
    /// assert_eq!(q.organizations, vec!["Bank of Japan"]);
    /// ```
    pub fn parse(&self, input: &str) -> ParsedQuery {
        let mut query = ParsedQuery::default();
        let mut pending = Pending::None;

        for token in input.split_whitespace() {
            if let Some(rest) = token.strip_prefix(ORG_PREFIX) {
                pending.flush_into(&mut query);
                pending = Pending::Organization(start_name(rest));
            } else if let Some(rest) = token.strip_prefix(PERSON_PREFIX) {
                pending.flush_into(&mut query);
                pending = Pending::Person(start_name(rest));
            } else if let Some(rest) = token.strip_prefix('-') {
                pending.flush_into(&mut query);
                if !rest.is_empty() {
                    query.excluded_terms.push(self.normalize(rest));
                }
            } else {
                match &mut pending {
                    Pending::Organization(words) | Pending::Person(words) => {
                        words.push(token.to_string())
                    }
                    Pending::None => query.terms.push(self.normalize(token)),
                }
            }
        }
        pending.flush_into(&mut query);

        debug!(
            terms = query.terms.len(),
            excluded = query.excluded_terms.len(),
            organizations = query.organizations.len(),
            persons = query.persons.len(),
            "Parsed query"
        );
        query
    }

    fn normalize(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase())
    }
}

/// Parses query strings and evaluates them against an engine
#[derive(Debug)]
pub struct QueryProcessor<'a> {
    engine: &'a IndexEngine,
    parser: QueryParser,
    max_results: usize,
}

impl<'a> QueryProcessor<'a> {
    /// Processor using the default result limit
    pub fn new(engine: &'a IndexEngine) -> Self {
        Self::with_config(engine, &SearchConfig::default())
    }

    /// Processor taking its result limit from `config`
    pub fn with_config(engine: &'a IndexEngine, config: &SearchConfig) -> Self {
        QueryProcessor {
            engine,
            parser: QueryParser::new(),
            max_results: config.max_results,
        }
    }

    /// Builder: set the result limit used by [`process_top`](Self::process_top)
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Result limit for [`process_top`](Self::process_top)
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Parse only
    pub fn parse(&self, input: &str) -> ParsedQuery {
        self.parser.parse(input)
    }

    /// Every match, best first
    pub fn process(&self, input: &str) -> Vec<Arc<Document>> {
        self.engine.evaluate(&self.parser.parse(input))
    }

    /// At most `max_results` matches, best first
    pub fn process_top(&self, input: &str) -> Vec<Arc<Document>> {
        let mut results = self.process(input);
        results.truncate(self.max_results);
        results
    }

    /// Every match with its score, best first
    pub fn process_scored(&self, input: &str) -> Vec<ScoredDocument> {
        self.engine.evaluate_scored(&self.parser.parse(input))
    }
}
