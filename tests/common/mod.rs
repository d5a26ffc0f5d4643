//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from a test file.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Once;

use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Corpus fixtures
// ============================================================================

/// Write one article as `<dir>/<name>`.
pub fn write_article(
    dir: &Path,
    name: &str,
    title: &str,
    text: &str,
    organizations: &[&str],
    persons: &[&str],
) {
    let article = json!({
        "title": title,
        "publication": "Reuters",
        "date_published": "2018-02-01T00:00:00.000+02:00",
        "text": text,
        "authors": ["Newsroom"],
        "organizations": organizations.iter().map(|o| json!({ "name": o })).collect::<Vec<_>>(),
        "persons": persons.iter().map(|p| json!({ "name": p })).collect::<Vec<_>>(),
    });
    if let Some(parent) = dir.join(name).parent() {
        fs::create_dir_all(parent).expect("create article dir");
    }
    fs::write(dir.join(name), article.to_string()).expect("write article");
}

/// A small financial-news corpus in a fresh temp directory.
///
/// | file                   | mentions                          |
/// |------------------------|-----------------------------------|
/// | boj/rates.json         | bank, rates (x3), Bank of Japan   |
/// | boj/yen.json           | bank, yen, Bank of Japan, Kuroda  |
/// | fed/hike.json          | rates, Federal Reserve, Powell    |
/// | markets/stocks.json    | stocks, markets                   |
pub fn news_corpus() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();
    write_article(
        root,
        "boj/rates.json",
        "BOJ holds rates",
        "The central bank kept rates unchanged. Rates are low, and rates may stay low.",
        &["Bank of Japan"],
        &[],
    );
    write_article(
        root,
        "boj/yen.json",
        "Yen slides",
        "The yen slid after the bank signalled patience.",
        &["Bank of Japan"],
        &["Haruhiko Kuroda"],
    );
    write_article(
        root,
        "fed/hike.json",
        "Fed raises rates",
        "Policy makers raised rates again.",
        &["Federal Reserve"],
        &["Jerome Powell"],
    );
    write_article(
        root,
        "markets/stocks.json",
        "Stocks rally",
        "Stocks rallied across global markets.",
        &[],
        &[],
    );
    fs::write(root.join("markets/README.txt"), "not an article").expect("write readme");
    dir
}
