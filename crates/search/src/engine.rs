//! Index engine
//!
//! `IndexEngine` owns the three keyed indices and the document store:
//! - terms: processed-text token -> documents containing it
//! - organizations: organization name -> documents mentioning it
//! - persons: person name -> documents mentioning it
//!
//! Ingestion mutates all four structures; queries only read them. Every
//! posting list refers to the same `Arc<Document>` the store holds, so a
//! document is stored once no matter how many keys point at it.
//!
//! # Query evaluation
//!
//! Included terms, organizations and persons are ANDed together, excluded
//! terms are subtracted, and survivors are ranked by summed TF-IDF over the
//! included terms.

use crate::ingest::DocumentParser;
use crate::query::ParsedQuery;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use supersearch_core::{
    index_file_path, Document, Result, DOCS_SUFFIX, ORGS_SUFFIX, PERSONS_SUFFIX, TERMS_SUFFIX,
};
use supersearch_storage::{OrderedIndexMap, PostingList};
use tracing::{debug, info, warn};

// ============================================================================
// ScoredDocument
// ============================================================================

/// A query result with its relevance score
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    /// The matching document
    pub document: Arc<Document>,
    /// Sum of TF-IDF over the included query terms
    pub score: f64,
}

// ============================================================================
// IndexEngine
// ============================================================================

/// Term, organization and person indices over a shared document store
#[derive(Debug, Default)]
pub struct IndexEngine {
    terms: OrderedIndexMap<PostingList>,
    organizations: OrderedIndexMap<PostingList>,
    persons: OrderedIndexMap<PostingList>,
    documents: HashMap<String, Arc<Document>>,
}

impl IndexEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in the store
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of distinct terms in the term index
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Stored document for `path`
    pub fn document(&self, path: &str) -> Option<&Arc<Document>> {
        self.documents.get(path)
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Index a document under every term of its processed text, every
    /// organization and every person.
    ///
    /// A document whose path is already indexed replaces the earlier one:
    /// the old version is removed from all of its posting lists first.
    pub fn add_document(&mut self, doc: impl Into<Arc<Document>>) -> Arc<Document> {
        let doc = doc.into();

        if let Some(previous) = self.documents.remove(doc.path()) {
            self.unlink(&previous);
        }

        for term in doc.terms() {
            add_posting(&mut self.terms, term, &doc);
        }
        for org in doc.organizations() {
            add_posting(&mut self.organizations, org, &doc);
        }
        for person in doc.persons() {
            add_posting(&mut self.persons, person, &doc);
        }

        debug!(
            path = doc.path(),
            terms = doc.term_frequencies().len(),
            organizations = doc.organizations().len(),
            persons = doc.persons().len(),
            "Indexed document"
        );

        self.documents.insert(doc.path().to_string(), Arc::clone(&doc));
        doc
    }

    /// Index `doc` if present; `None` is a no-op.
    pub fn add_optional(&mut self, doc: Option<Document>) -> Option<Arc<Document>> {
        doc.map(|d| self.add_document(d))
    }

    /// Parse every JSON article under `dir` and index it.
    ///
    /// Returns the number of documents added.
    pub fn index_directory(
        &mut self,
        dir: impl AsRef<Path>,
        parser: &DocumentParser,
    ) -> Result<usize> {
        let dir = dir.as_ref();
        let docs = parser.parse_directory(dir)?;
        let count = docs.len();
        for doc in docs {
            self.add_document(doc);
        }
        info!(
            dir = %dir.display(),
            documents = count,
            terms = self.terms.len(),
            "Indexed directory"
        );
        Ok(count)
    }

    fn unlink(&mut self, doc: &Document) {
        let path = doc.path();
        for term in doc.terms() {
            if let Some(list) = self.terms.find_mut(term) {
                list.remove(path);
            }
        }
        for org in doc.organizations() {
            if let Some(list) = self.organizations.find_mut(org) {
                list.remove(path);
            }
        }
        for person in doc.persons() {
            if let Some(list) = self.persons.find_mut(person) {
                list.remove(path);
            }
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Documents whose processed text contains `term`; empty when unknown.
    pub fn search(&self, term: &str) -> &[Arc<Document>] {
        postings(&self.terms, term)
    }

    /// Documents mentioning the organization `name`.
    pub fn search_organization(&self, name: &str) -> &[Arc<Document>] {
        postings(&self.organizations, name)
    }

    /// Documents mentioning the person `name`.
    pub fn search_person(&self, name: &str) -> &[Arc<Document>] {
        postings(&self.persons, name)
    }

    /// The posting list for `term`, or `None` if the term was never indexed
    pub fn lookup_term(&self, term: &str) -> Option<&PostingList> {
        self.terms.find(term)
    }

    // ========================================================================
    // Query evaluation
    // ========================================================================

    /// Evaluate a boolean query and return the matches ranked by relevance.
    ///
    /// A document matches if it carries every term, organization and person
    /// and none of the excluded terms. Ties keep path order.
    pub fn get_relevant_documents(
        &self,
        terms: &[String],
        excluded_terms: &[String],
        organizations: &[String],
        persons: &[String],
    ) -> Vec<Arc<Document>> {
        self.get_scored_documents(terms, excluded_terms, organizations, persons)
            .into_iter()
            .map(|scored| scored.document)
            .collect()
    }

    /// Like [`get_relevant_documents`](Self::get_relevant_documents), keeping the scores.
    pub fn get_scored_documents(
        &self,
        terms: &[String],
        excluded_terms: &[String],
        organizations: &[String],
        persons: &[String],
    ) -> Vec<ScoredDocument> {
        let Some(mut matches) = self.match_all(terms, organizations, persons) else {
            return Vec::new();
        };

        for term in excluded_terms {
            if matches.is_empty() {
                break;
            }
            if let Some(list) = self.terms.find(term) {
                matches = matches.difference(list);
            }
        }

        self.rank(&matches, terms)
    }

    /// Evaluate a parsed query.
    pub fn evaluate(&self, query: &ParsedQuery) -> Vec<Arc<Document>> {
        self.get_relevant_documents(
            &query.terms,
            &query.excluded_terms,
            &query.organizations,
            &query.persons,
        )
    }

    /// Evaluate a parsed query, keeping the scores.
    pub fn evaluate_scored(&self, query: &ParsedQuery) -> Vec<ScoredDocument> {
        self.get_scored_documents(
            &query.terms,
            &query.excluded_terms,
            &query.organizations,
            &query.persons,
        )
    }

    /// TF-IDF of `term` in `doc` against a corpus of `total_documents`.
    ///
    /// TF is the raw count in the processed text; IDF is
    /// `ln(total / (1 + df))`. A document that does not contain the term
    /// contributes 0.
    pub fn calculate_tf_idf(&self, term: &str, doc: &Document, total_documents: usize) -> f64 {
        let tf = doc.term_frequency(term);
        if tf == 0 {
            return 0.0;
        }
        f64::from(tf) * idf(total_documents, self.search(term).len())
    }

    /// Intersection of every included constraint.
    ///
    /// `None` means there was no positive constraint to seed from.
    fn match_all(
        &self,
        terms: &[String],
        organizations: &[String],
        persons: &[String],
    ) -> Option<PostingList> {
        let mut constraints = terms
            .iter()
            .map(|t| self.terms.find(t))
            .chain(organizations.iter().map(|o| self.organizations.find(o)))
            .chain(persons.iter().map(|p| self.persons.find(p)));

        let empty = PostingList::new();
        let mut matches = constraints.next()?.unwrap_or(&empty).clone();
        for list in constraints {
            if matches.is_empty() {
                break;
            }
            matches = match list {
                Some(list) => matches.intersect(list),
                None => PostingList::new(),
            };
        }
        Some(matches)
    }

    fn rank(&self, matches: &PostingList, terms: &[String]) -> Vec<ScoredDocument> {
        let total = self.documents.len();
        let weights: Vec<(&str, f64)> = terms
            .iter()
            .map(|t| (t.as_str(), idf(total, self.search(t).len())))
            .collect();

        let mut scored: Vec<ScoredDocument> = matches
            .iter()
            .map(|doc| {
                let score = weights
                    .iter()
                    .map(|&(term, weight)| match doc.term_frequency(term) {
                        0 => 0.0,
                        tf => f64::from(tf) * weight,
                    })
                    .sum();
                ScoredDocument {
                    document: Arc::clone(doc),
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save the three indices to `<base>_terms.idx`, `<base>_orgs.idx` and
    /// `<base>_persons.idx`, and the document store to `<base>_docs.idx`.
    ///
    /// The document store keeps documents without terms or names, so a
    /// reload sees the same corpus size.
    pub fn try_save_indices(&self, base: &str) -> Result<()> {
        let terms = self.terms.save_to_file(index_file_path(base, TERMS_SUFFIX))?;
        let orgs = self
            .organizations
            .save_to_file(index_file_path(base, ORGS_SUFFIX))?;
        let persons = self
            .persons
            .save_to_file(index_file_path(base, PERSONS_SUFFIX))?;
        let documents = self
            .document_store()
            .save_to_file(index_file_path(base, DOCS_SUFFIX))?;
        info!(base, terms, orgs, persons, documents, "Saved indices");
        Ok(())
    }

    /// Load the indices and the document store saved under `base`.
    ///
    /// Nothing changes unless all four files load. Posting lists are
    /// re-pointed at the stored documents, so each path has one handle.
    pub fn try_load_indices(&mut self, base: &str) -> Result<()> {
        let mut store = OrderedIndexMap::new();
        let mut terms = OrderedIndexMap::new();
        let mut organizations = OrderedIndexMap::new();
        let mut persons = OrderedIndexMap::new();
        let doc_stats = store.load_from_file(index_file_path(base, DOCS_SUFFIX))?;
        let term_stats = terms.load_from_file(index_file_path(base, TERMS_SUFFIX))?;
        let org_stats = organizations.load_from_file(index_file_path(base, ORGS_SUFFIX))?;
        let person_stats = persons.load_from_file(index_file_path(base, PERSONS_SUFFIX))?;

        let mut documents = HashMap::new();
        for map in [&mut store, &mut terms, &mut organizations, &mut persons] {
            map.for_each_value_mut(|_, list: &mut PostingList| list.intern(&mut documents));
        }

        self.terms = terms;
        self.organizations = organizations;
        self.persons = persons;
        self.documents = documents;

        info!(
            base,
            terms = term_stats.loaded,
            orgs = org_stats.loaded,
            persons = person_stats.loaded,
            skipped = doc_stats.skipped
                + term_stats.skipped
                + org_stats.skipped
                + person_stats.skipped,
            documents = self.documents.len(),
            "Loaded indices"
        );
        Ok(())
    }

    /// Every stored document keyed by its path
    fn document_store(&self) -> OrderedIndexMap<PostingList> {
        let mut store = OrderedIndexMap::new();
        for (path, doc) in &self.documents {
            store.insert(path.as_str(), PostingList::singleton(Arc::clone(doc)));
        }
        store
    }

    /// Save the indices, logging and otherwise ignoring any failure.
    pub fn save_indices(&self, base: &str) {
        if let Err(e) = self.try_save_indices(base) {
            warn!(base, error = %e, "Failed to save indices");
        }
    }

    /// Load the indices, logging and otherwise ignoring any failure.
    ///
    /// On failure the in-memory index is left as it was.
    pub fn load_indices(&mut self, base: &str) {
        if let Err(e) = self.try_load_indices(base) {
            warn!(base, error = %e, "Failed to load indices");
        }
    }
}

fn add_posting(index: &mut OrderedIndexMap<PostingList>, key: &str, doc: &Arc<Document>) {
    match index.find_mut(key) {
        Some(list) => {
            list.insert(Arc::clone(doc));
        }
        None => {
            index.insert(key, PostingList::singleton(Arc::clone(doc)));
        }
    }
}

fn postings<'a>(index: &'a OrderedIndexMap<PostingList>, key: &str) -> &'a [Arc<Document>] {
    index.find(key).map(PostingList::docs).unwrap_or(&[])
}

fn idf(total_documents: usize, document_frequency: usize) -> f64 {
    (total_documents as f64 / (1.0 + document_frequency as f64)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(path: &str, processed: &str) -> Document {
        Document::builder(path)
            .title(path.to_uppercase())
            .text(processed)
            .processed_text(processed)
            .build()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn paths(docs: &[Arc<Document>]) -> Vec<&str> {
        docs.iter().map(|d| d.path()).collect()
    }

    /// A{bank, rate}, B{bank}, C{rate}
    fn bank_rate_engine() -> IndexEngine {
        let mut engine = IndexEngine::new();
        engine.add_document(doc("A", "bank rate"));
        engine.add_document(doc("B", "bank"));
        engine.add_document(doc("C", "rate"));
        engine
    }

    #[test]
    fn test_add_document_indexes_every_key() {
        let mut engine = IndexEngine::new();
        let d = Document::builder("a.json")
            .processed_text("bank rate bank")
            .organizations(strings(&["Bank of Japan"]))
            .persons(strings(&["Haruhiko Kuroda"]))
            .build();
        engine.add_document(d);

        assert_eq!(engine.document_count(), 1);
        assert_eq!(engine.term_count(), 2);
        assert_eq!(paths(engine.search("bank")), vec!["a.json"]);
        assert_eq!(paths(engine.search_organization("Bank of Japan")), vec!["a.json"]);
        assert_eq!(paths(engine.search_person("Haruhiko Kuroda")), vec!["a.json"]);
        assert!(engine.search("missing").is_empty());
        assert!(engine.lookup_term("missing").is_none());
    }

    #[test]
    fn test_add_optional_none_is_noop() {
        let mut engine = IndexEngine::new();
        assert!(engine.add_optional(None).is_none());
        assert_eq!(engine.document_count(), 0);
        assert!(engine.add_optional(Some(doc("x", "bank"))).is_some());
        assert_eq!(engine.document_count(), 1);
    }

    #[test]
    fn test_postings_share_the_stored_handle() {
        let mut engine = IndexEngine::new();
        let stored = engine.add_document(doc("a", "bank rate"));
        assert!(Arc::ptr_eq(&engine.search("bank")[0], &stored));
        assert!(Arc::ptr_eq(&engine.search("rate")[0], &stored));
        assert!(Arc::ptr_eq(engine.document("a").unwrap(), &stored));
    }

    #[test]
    fn test_readding_a_path_replaces_the_document() {
        let mut engine = IndexEngine::new();
        engine.add_document(doc("a", "bank rate"));
        engine.add_document(doc("a", "rate rate"));

        assert_eq!(engine.document_count(), 1);
        assert!(engine.search("bank").is_empty());
        assert!(engine.lookup_term("bank").is_some());
        assert_eq!(engine.search("rate").len(), 1);
        assert_eq!(engine.search("rate")[0].term_frequency("rate"), 2);
    }

    #[test]
    fn test_and_of_two_terms() {
        let engine = bank_rate_engine();
        let results = engine.get_relevant_documents(&strings(&["bank", "rate"]), &[], &[], &[]);
        assert_eq!(paths(&results), vec!["A"]);
    }

    #[test]
    fn test_exclusion() {
        let engine = bank_rate_engine();
        let results = engine.get_relevant_documents(&strings(&["bank"]), &strings(&["rate"]), &[], &[]);
        assert_eq!(paths(&results), vec!["B"]);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let engine = bank_rate_engine();
        assert!(engine.get_relevant_documents(&[], &[], &[], &[]).is_empty());
    }

    #[test]
    fn test_exclusions_alone_return_nothing() {
        let engine = bank_rate_engine();
        assert!(engine
            .get_relevant_documents(&[], &strings(&["bank"]), &[], &[])
            .is_empty());
    }

    #[test]
    fn test_unknown_term_short_circuits() {
        let engine = bank_rate_engine();
        let results =
            engine.get_relevant_documents(&strings(&["bank", "zebra"]), &[], &[], &[]);
        assert!(results.is_empty());
        let results = engine.get_relevant_documents(&strings(&["zebra", "bank"]), &[], &[], &[]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_seed_from_organization_then_person() {
        let mut engine = IndexEngine::new();
        engine.add_document(
            Document::builder("1")
                .processed_text("bank")
                .organizations(strings(&["IMF"]))
                .persons(strings(&["Lagarde"]))
                .build(),
        );
        engine.add_document(
            Document::builder("2")
                .processed_text("bank")
                .organizations(strings(&["IMF"]))
                .build(),
        );

        let by_org = engine.get_relevant_documents(&[], &[], &strings(&["IMF"]), &[]);
        assert_eq!(paths(&by_org), vec!["1", "2"]);

        let by_both =
            engine.get_relevant_documents(&[], &[], &strings(&["IMF"]), &strings(&["Lagarde"]));
        assert_eq!(paths(&by_both), vec!["1"]);

        let by_person = engine.get_relevant_documents(&[], &[], &[], &strings(&["Lagarde"]));
        assert_eq!(paths(&by_person), vec!["1"]);
    }

    #[test]
    fn test_ranking_by_term_frequency() {
        let mut engine = IndexEngine::new();
        engine.add_document(doc("once", "market"));
        engine.add_document(doc("thrice", "market market market"));
        engine.add_document(doc("other1", "bank"));
        engine.add_document(doc("other2", "rate"));

        let scored = engine.get_scored_documents(&strings(&["market"]), &[], &[], &[]);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].document.path(), "thrice");
        assert!(scored[0].score > scored[1].score);
        let expected = 3.0 * (4.0f64 / 3.0).ln();
        assert!((scored[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_path_order() {
        let mut engine = IndexEngine::new();
        engine.add_document(doc("b", "bank"));
        engine.add_document(doc("a", "bank"));
        let results = engine.get_relevant_documents(&strings(&["bank"]), &[], &[], &[]);
        assert_eq!(paths(&results), vec!["a", "b"]);
    }

    #[test]
    fn test_calculate_tf_idf() {
        let engine = bank_rate_engine();
        let a = engine.document("A").unwrap();
        let value = engine.calculate_tf_idf("bank", a, 3);
        assert!((value - (3.0f64 / 3.0).ln()).abs() < 1e-9);

        let c = engine.document("C").unwrap();
        assert_eq!(engine.calculate_tf_idf("bank", c, 3), 0.0);
        assert_eq!(engine.calculate_tf_idf("bank", c, 0), 0.0);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("index").to_string_lossy().into_owned();

        let mut engine = IndexEngine::new();
        engine.add_document(
            Document::builder("data/a.json")
                .title("Rates; up")
                .text("Rates are up.\nBanks react.")
                .processed_text("rate up bank react")
                .organizations(strings(&["Bank of Japan"]))
                .build(),
        );
        engine.add_document(doc("data/b.json", "bank"));
        engine.try_save_indices(&base).unwrap();

        let mut restored = IndexEngine::new();
        restored.try_load_indices(&base).unwrap();

        assert_eq!(restored.document_count(), 2);
        assert_eq!(restored.term_count(), engine.term_count());
        assert_eq!(
            paths(restored.search_organization("Bank of Japan")),
            vec!["data/a.json"]
        );
        let a = restored.document("data/a.json").unwrap();
        assert_eq!(a.title(), "Rates; up");
        assert_eq!(a.text(), "Rates are up.\nBanks react.");
        assert!(Arc::ptr_eq(&restored.search("rate")[0], a));
        assert!(Arc::ptr_eq(&restored.search_organization("Bank of Japan")[0], a));

        let before = engine.get_scored_documents(&strings(&["bank"]), &[], &[], &[]);
        let after = restored.get_scored_documents(&strings(&["bank"]), &[], &[], &[]);
        assert_eq!(before.len(), after.len());
        for (x, y) in before.iter().zip(&after) {
            assert_eq!(x.document.path(), y.document.path());
            assert!((x.score - y.score).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reload_keeps_documents_without_keys() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("index").to_string_lossy().into_owned();

        let mut engine = IndexEngine::new();
        engine.add_document(doc("a", "bank bank"));
        engine.add_document(doc("b", "bank"));
        engine.add_document(doc("c", ""));
        engine.add_document(doc("d", ""));
        engine.try_save_indices(&base).unwrap();

        let mut restored = IndexEngine::new();
        restored.try_load_indices(&base).unwrap();
        assert_eq!(restored.document_count(), 4);
        assert!(restored.document("c").is_some());
        assert!(restored.document("d").is_some());

        let query = strings(&["bank"]);
        let before = engine.get_scored_documents(&query, &[], &[], &[]);
        let after = restored.get_scored_documents(&query, &[], &[], &[]);
        assert_eq!(before[0].document.path(), "a");
        assert_eq!(after[0].document.path(), "a");
        for (x, y) in before.iter().zip(&after) {
            assert_eq!(x.document.path(), y.document.path());
            assert!((x.score - y.score).abs() < 1e-9);
        }
    }

    #[test]
    fn test_search_agrees_with_term_frequency() {
        let mut engine = IndexEngine::new();
        engine.add_document(doc("a", "fed Fed fed"));
        assert_eq!(paths(engine.search("fed")), vec!["a"]);
        assert_eq!(paths(engine.search("Fed")), vec!["a"]);
        let a = engine.document("a").unwrap();
        assert_eq!(a.term_frequency("fed"), 2);
        assert_eq!(a.term_frequency("Fed"), 1);
    }

    #[test]
    fn test_failed_load_leaves_index_unchanged() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("missing").to_string_lossy().into_owned();

        let mut engine = bank_rate_engine();
        assert!(engine.try_load_indices(&base).is_err());
        engine.load_indices(&base);

        assert_eq!(engine.document_count(), 3);
        assert_eq!(paths(engine.search("bank")), vec!["A", "B"]);
    }

    #[test]
    fn test_failed_save_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let base = dir
            .path()
            .join("no/such/dir/index")
            .to_string_lossy()
            .into_owned();
        let engine = bank_rate_engine();
        assert!(engine.try_save_indices(&base).is_err());
        engine.save_indices(&base);
    }
}
