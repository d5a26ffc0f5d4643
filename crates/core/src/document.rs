//! Document record
//!
//! A `Document` is one ingested article: metadata, the original text, the
//! processed (normalized) text that gets indexed, and the per-term counts used
//! for ranking. Documents are built once through [`DocumentBuilder`] and are
//! read-only afterwards; indices share them behind `Arc`.

use std::collections::HashMap;

/// One ingested article
///
/// Identity is the file path: two documents with the same path are the same
/// document as far as the index is concerned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    path: String,
    title: String,
    publication: String,
    date_published: String,
    text: String,
    processed_text: String,
    authors: Vec<String>,
    organizations: Vec<String>,
    persons: Vec<String>,
    term_frequencies: HashMap<String, u32>,
}

impl Document {
    /// Start building a document identified by `path`
    pub fn builder(path: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder::new(path)
    }

    /// File path (unique key)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Article title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Publication name
    pub fn publication(&self) -> &str {
        &self.publication
    }

    /// Publication date, kept as an opaque string
    pub fn date_published(&self) -> &str {
        &self.date_published
    }

    /// Original, unprocessed article text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Normalized text (lowercased, stop words removed, stemmed)
    ///
    /// Tokens are used verbatim as index keys, so this is expected to be
    /// lowercase already, as the analyzer produces it.
    pub fn processed_text(&self) -> &str {
        &self.processed_text
    }

    /// Article authors
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Organizations mentioned in the article
    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }

    /// Persons mentioned in the article
    pub fn persons(&self) -> &[String] {
        &self.persons
    }

    /// Number of occurrences of `term` in the processed text
    ///
    /// Matches exactly the tokens yielded by [`terms`](Self::terms), which
    /// are also the term index keys; returns 0 for unknown terms.
    pub fn term_frequency(&self, term: &str) -> u32 {
        self.term_frequencies.get(term).copied().unwrap_or(0)
    }

    /// All term counts
    pub fn term_frequencies(&self) -> &HashMap<String, u32> {
        &self.term_frequencies
    }

    /// Iterate the whitespace-separated terms of the processed text
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.processed_text.split_whitespace()
    }
}

/// Builder for [`Document`]
///
/// Term frequencies are derived from the processed text in [`build`](Self::build),
/// so they always agree with what the index sees.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    doc: Document,
}

impl DocumentBuilder {
    /// Create a builder for the document at `path`
    pub fn new(path: impl Into<String>) -> Self {
        DocumentBuilder {
            doc: Document {
                path: path.into(),
                ..Document::default()
            },
        }
    }

    /// Builder: set title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.doc.title = title.into();
        self
    }

    /// Builder: set publication
    pub fn publication(mut self, publication: impl Into<String>) -> Self {
        self.doc.publication = publication.into();
        self
    }

    /// Builder: set publication date
    pub fn date_published(mut self, date: impl Into<String>) -> Self {
        self.doc.date_published = date.into();
        self
    }

    /// Builder: set original text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.doc.text = text.into();
        self
    }

    /// Builder: set processed text
    pub fn processed_text(mut self, processed: impl Into<String>) -> Self {
        self.doc.processed_text = processed.into();
        self
    }

    /// Builder: set authors
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.doc.authors = authors;
        self
    }

    /// Builder: set organizations
    pub fn organizations(mut self, organizations: Vec<String>) -> Self {
        self.doc.organizations = organizations;
        self
    }

    /// Builder: set persons
    pub fn persons(mut self, persons: Vec<String>) -> Self {
        self.doc.persons = persons;
        self
    }

    /// Finish the document, counting terms of the processed text
    pub fn build(mut self) -> Document {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for term in self.doc.processed_text.split_whitespace() {
            *counts.entry(term.to_string()).or_insert(0) += 1;
        }
        self.doc.term_frequencies = counts;
        self.doc
    }
}
