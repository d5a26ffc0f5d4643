//! Property tests for stemming and boolean query evaluation
//!
//! Validates that:
//! - Stemming is deterministic and never lengthens a lowercase ASCII word
//! - Every result satisfies all included constraints and no exclusion
//! - Every document satisfying the constraints is returned
//! - Results are ordered by non-increasing score

use proptest::prelude::*;
use std::collections::HashSet;
use supersearch_core::Document;
use supersearch_search::{stem, IndexEngine};

const VOCABULARY: &[&str] = &["bank", "rate", "loan", "market", "fund"];
const ORGANIZATIONS: &[&str] = &["IMF", "Bank of Japan", "Federal Reserve"];

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
struct Corpus {
    docs: Vec<(Vec<usize>, Vec<usize>)>,
}

fn corpus_strategy() -> impl Strategy<Value = Corpus> {
    prop::collection::vec(
        (
            prop::collection::vec(0..VOCABULARY.len(), 0..6),
            prop::collection::vec(0..ORGANIZATIONS.len(), 0..2),
        ),
        1..12,
    )
    .prop_map(|docs| Corpus { docs })
}

fn build_engine(corpus: &Corpus) -> IndexEngine {
    let mut engine = IndexEngine::new();
    for (i, (words, orgs)) in corpus.docs.iter().enumerate() {
        let text: Vec<&str> = words.iter().map(|&w| VOCABULARY[w]).collect();
        let orgs: Vec<String> = orgs.iter().map(|&o| ORGANIZATIONS[o].to_string()).collect();
        engine.add_document(
            Document::builder(format!("doc{:02}.json", i))
                .processed_text(text.join(" "))
                .organizations(orgs)
                .build(),
        );
    }
    engine
}

fn satisfies(doc: &Document, terms: &[String], excluded: &[String], orgs: &[String]) -> bool {
    let doc_terms: HashSet<&str> = doc.terms().collect();
    terms.iter().all(|t| doc_terms.contains(t.as_str()))
        && excluded.iter().all(|t| !doc_terms.contains(t.as_str()))
        && orgs.iter().all(|o| doc.organizations().contains(o))
}

fn pick(indices: &[usize], table: &[&str]) -> Vec<String> {
    indices.iter().map(|&i| table[i].to_string()).collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn stem_is_deterministic_and_never_longer(word in "[a-z]{0,14}") {
        let first = stem(&word);
        prop_assert_eq!(&first, &stem(&word));
        prop_assert!(first.len() <= word.len());
    }

    #[test]
    fn query_results_match_brute_force(
        corpus in corpus_strategy(),
        terms in prop::collection::vec(0..VOCABULARY.len(), 0..3),
        excluded in prop::collection::vec(0..VOCABULARY.len(), 0..2),
        orgs in prop::collection::vec(0..ORGANIZATIONS.len(), 0..2),
    ) {
        let engine = build_engine(&corpus);
        let terms = pick(&terms, VOCABULARY);
        let excluded = pick(&excluded, VOCABULARY);
        let orgs = pick(&orgs, ORGANIZATIONS);

        let scored = engine.get_scored_documents(&terms, &excluded, &orgs, &[]);

        let returned: HashSet<&str> = scored.iter().map(|s| s.document.path()).collect();
        prop_assert_eq!(returned.len(), scored.len());

        if terms.is_empty() && orgs.is_empty() {
            prop_assert!(scored.is_empty());
        } else {
            for i in 0..corpus.docs.len() {
                let path = format!("doc{:02}.json", i);
                let doc = engine.document(&path).unwrap();
                prop_assert_eq!(
                    returned.contains(path.as_str()),
                    satisfies(doc, &terms, &excluded, &orgs)
                );
            }
        }

        for pair in scored.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
