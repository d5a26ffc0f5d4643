//! Posting lists
//!
//! A `PostingList` is the set of documents carrying one index key. Entries are
//! shared `Arc<Document>` handles, kept sorted and unique by document path, so
//! intersection and difference are linear merges over two sorted lists.

use crate::codec::{write_field, write_list, CodecError, FieldReader, IndexValue};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use supersearch_core::Document;

/// Documents containing one term, organization or person
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingList {
    docs: Vec<Arc<Document>>,
}

impl PostingList {
    /// Create a new empty posting list
    pub fn new() -> Self {
        PostingList { docs: Vec::new() }
    }

    /// A list holding exactly one document
    pub fn singleton(doc: Arc<Document>) -> Self {
        PostingList { docs: vec![doc] }
    }

    /// Build from documents in any order; later duplicates of a path win.
    pub fn from_docs(docs: impl IntoIterator<Item = Arc<Document>>) -> Self {
        let mut list = PostingList::new();
        for doc in docs {
            list.insert(doc);
        }
        list
    }

    /// Add a document, keeping path order.
    ///
    /// A document whose path is already present replaces the old handle.
    /// Returns true if the path was new.
    pub fn insert(&mut self, doc: Arc<Document>) -> bool {
        match self.position(doc.path()) {
            Ok(idx) => {
                self.docs[idx] = doc;
                false
            }
            Err(idx) => {
                self.docs.insert(idx, doc);
                true
            }
        }
    }

    /// Remove the document with `path`; returns true if it was present
    pub fn remove(&mut self, path: &str) -> bool {
        match self.position(path) {
            Ok(idx) => {
                self.docs.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Check whether a document with `path` is in the list
    pub fn contains(&self, path: &str) -> bool {
        self.position(path).is_ok()
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check if posting list is empty
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Documents in path order
    pub fn docs(&self) -> &[Arc<Document>] {
        &self.docs
    }

    /// Iterate documents in path order
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Document>> {
        self.docs.iter()
    }

    /// Documents present in both lists
    pub fn intersect(&self, other: &PostingList) -> PostingList {
        PostingList {
            docs: intersect_sorted(&self.docs, &other.docs),
        }
    }

    /// Documents of `self` that are not in `other`
    pub fn difference(&self, other: &PostingList) -> PostingList {
        PostingList {
            docs: difference_sorted(&self.docs, &other.docs),
        }
    }

    /// Swap each handle for the canonical one in `store`, registering
    /// documents the store has not seen yet.
    pub fn intern(&mut self, store: &mut HashMap<String, Arc<Document>>) {
        for doc in &mut self.docs {
            let canonical = store
                .entry(doc.path().to_string())
                .or_insert_with(|| Arc::clone(doc));
            *doc = Arc::clone(canonical);
        }
    }

    fn position(&self, path: &str) -> Result<usize, usize> {
        self.docs.binary_search_by(|d| d.path().cmp(path))
    }
}

impl<'a> IntoIterator for &'a PostingList {
    type Item = &'a Arc<Document>;
    type IntoIter = std::slice::Iter<'a, Arc<Document>>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

/// Merge-intersect two slices sorted by path.
pub fn intersect_sorted(a: &[Arc<Document>], b: &[Arc<Document>]) -> Vec<Arc<Document>> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].path().cmp(b[j].path()) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(Arc::clone(&a[i]));
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Merge-difference (`a` minus `b`) of two slices sorted by path.
pub fn difference_sorted(a: &[Arc<Document>], b: &[Arc<Document>]) -> Vec<Arc<Document>> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;
    for doc in a {
        while j < b.len() && b[j].path() < doc.path() {
            j += 1;
        }
        if j < b.len() && b[j].path() == doc.path() {
            continue;
        }
        out.push(Arc::clone(doc));
    }
    out
}

// ============================================================================
// Persistence
// ============================================================================

fn encode_document(doc: &Document, out: &mut String) {
    for field in [
        doc.path(),
        doc.title(),
        doc.publication(),
        doc.date_published(),
        doc.text(),
        doc.processed_text(),
    ] {
        write_field(out, field);
        out.push(' ');
    }
    write_list(out, doc.authors());
    out.push(' ');
    write_list(out, doc.organizations());
    out.push(' ');
    write_list(out, doc.persons());
}

fn decode_document(reader: &mut FieldReader<'_>) -> Result<Document, CodecError> {
    let path = reader.read_field("path")?;
    reader.expect(' ')?;
    let title = reader.read_field("title")?;
    reader.expect(' ')?;
    let publication = reader.read_field("publication")?;
    reader.expect(' ')?;
    let date = reader.read_field("date")?;
    reader.expect(' ')?;
    let text = reader.read_field("text")?;
    reader.expect(' ')?;
    let processed = reader.read_field("processed text")?;
    reader.expect(' ')?;
    let authors = reader.read_list("authors")?;
    reader.expect(' ')?;
    let organizations = reader.read_list("organizations")?;
    reader.expect(' ')?;
    let persons = reader.read_list("persons")?;

    Ok(Document::builder(path)
        .title(title)
        .publication(publication)
        .date_published(date)
        .text(text)
        .processed_text(processed)
        .authors(authors)
        .organizations(organizations)
        .persons(persons)
        .build())
}

impl IndexValue for PostingList {
    fn encode_value(&self, out: &mut String) {
        let _ = write!(out, "{}", self.docs.len());
        for doc in &self.docs {
            out.push(' ');
            encode_document(doc, out);
        }
    }

    fn decode_value(input: &str) -> Result<Self, CodecError> {
        let mut reader = FieldReader::new(input);
        let count = reader.read_count("document count")?;
        let mut list = PostingList::new();
        for _ in 0..count {
            reader.expect(' ')?;
            list.insert(Arc::new(decode_document(&mut reader)?));
        }
        reader.finish()?;
        Ok(list)
    }
}
