//! Posting list access for query evaluation
//!
//! Decouples the evaluator from the cache, the trigram index and the
//! invalidated set, so it can be driven by the indexer or by fixtures.

use crate::models::{DocumentId, MatchMode, PostingEntry};

/// Trait for reading posting lists during evaluation
pub trait PostingAccessor: Send + Sync {
    /// Current entries of `term`, empty if it was never indexed
    fn postings(&self, term: &str) -> Vec<PostingEntry>;

    /// Vocabulary terms matching `fragment` under a wildcard mode, sorted
    fn expand(&self, fragment: &str, mode: MatchMode) -> Vec<String>;

    /// Whether a document was deleted and must not be returned
    fn is_invalidated(&self, doc_number: DocumentId) -> bool;
}
