//! Text normalization for indexing
//!
//! Pipeline: punctuation → spaces → whitespace split → lowercase
//!           → filter short tokens → remove stopwords → Porter stem
//!
//! The output of [`Analyzer::process`] is what a [`Document`]'s processed
//! text holds, and what the term index is keyed by.
//!
//! [`Document`]: supersearch_core::Document

use crate::stemmer::Stemmer;
use std::collections::HashSet;
use supersearch_core::SearchConfig;

/// Common English stopwords.
///
/// These high-frequency words carry little discriminative value for TF-IDF
/// and are filtered out during processing.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "this", "but", "they",
    "have", "had", "what", "when", "where", "who", "which", "why", "how", "all", "any", "both",
    "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
    "same", "so", "than", "too", "very", "can", "just", "should", "now", "i", "you", "your", "we",
    "my", "me", "her", "his", "their", "our", "us", "am", "been", "being", "do", "does", "did",
    "doing", "would", "could", "might", "must", "shall", "into", "if", "then", "else", "about",
];

/// Fixed set of words skipped during processing
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<&'static str>,
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new()
    }
}

impl StopWords {
    /// The built-in English list
    pub fn new() -> Self {
        StopWords {
            words: STOPWORDS.iter().copied().collect(),
        }
    }

    /// Case-insensitive membership test
    pub fn is_stop_word(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        self.words.contains(word.to_lowercase().as_str())
    }

    /// Number of words in the set
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Replace ASCII punctuation with spaces and drop other symbols.
///
/// # Example
///
/// ```
/// use supersearch_search::tokenizer::clean_text;
///
/// assert_eq!(clean_text("U.S. rates, up!"), "U S  rates  up ");
/// ```
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_ascii_punctuation() {
                Some(' ')
            } else if c.is_alphanumeric() || c.is_whitespace() {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Normalizes text into index terms
#[derive(Debug, Clone)]
pub struct Analyzer {
    stop_words: Option<StopWords>,
    min_token_len: usize,
    stemmer: Stemmer,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Analyzer with stop word removal and no length filter
    pub fn new() -> Self {
        Analyzer {
            stop_words: Some(StopWords::new()),
            min_token_len: 1,
            stemmer: Stemmer::new(),
        }
    }

    /// Analyzer configured from `supersearch.toml` settings
    pub fn from_config(config: &SearchConfig) -> Self {
        Analyzer {
            stop_words: config.remove_stop_words.then(StopWords::new),
            min_token_len: config.min_token_len,
            stemmer: Stemmer::new(),
        }
    }

    /// Builder: keep stop words
    pub fn without_stop_words(mut self) -> Self {
        self.stop_words = None;
        self
    }

    /// Normalized terms of `text`, in order, duplicates kept
    ///
    /// # Example
    ///
    /// ```
    /// use supersearch_search::tokenizer::Analyzer;
    ///
    /// let terms = Analyzer::new().tokens("The banks are raising rates");
    /// assert_eq!(terms, vec!["bank", "rais", "rate"]);
    /// ```
    pub fn tokens(&self, text: &str) -> Vec<String> {
        clean_text(text)
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|w| w.chars().count() >= self.min_token_len)
            .filter(|w| !self.is_stop_word(w))
            .map(|w| self.stemmer.stem(&w))
            .collect()
    }

    /// Normalized text: the tokens joined by single spaces
    pub fn process(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words
            .as_ref()
            .map_or(false, |s| s.is_stop_word(word))
    }
}
