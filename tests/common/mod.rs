#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use ftdex::postings::decode_entries;
use ftdex::{
    DocumentId, FullTextIndexer, Indexer, IndexerConfig, MaintenanceConfig, MatchMode,
    PostingEntry, TextDocument,
};

/// Config under `dir` without stemming or built-in stop words, with
/// maintenance slow enough that tests decide when files are written
pub fn config(dir: &Path) -> IndexerConfig {
    let mut config = IndexerConfig::new(dir)
        .with_fallback_stopwords(false)
        .with_maintenance(MaintenanceConfig {
            idle_interval_ms: 60_000,
            drain_pause_ms: 60_000,
        });
    config.tokenizer.stem = false;
    config
}

pub fn setup() -> (TempDir, FullTextIndexer) {
    let tmp = TempDir::new().unwrap();
    let indexer = FullTextIndexer::open(config(tmp.path())).unwrap();
    (tmp, indexer)
}

pub fn index(indexer: &FullTextIndexer, doc: DocumentId, text: &str) {
    indexer.index(&TextDocument::new(text), doc).unwrap();
}

pub fn query(indexer: &FullTextIndexer, text: &str, mode: MatchMode) -> Vec<DocumentId> {
    indexer.process_query(text, mode).unwrap().doc_numbers()
}

/// Records of a posting file as written, bypassing the indexer
pub fn raw_postings(root: &Path, term: &str) -> Vec<PostingEntry> {
    let mut path = root.to_path_buf();
    for c in term.chars().take(3) {
        path.push(match c {
            '.' | ',' => "_".to_string(),
            c => c.to_string(),
        });
    }
    path.push(format!("idx-{}", term));
    fs::read(path)
        .map(|bytes| decode_entries(&bytes))
        .unwrap_or_default()
}
