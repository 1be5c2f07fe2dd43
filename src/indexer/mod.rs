//! Indexer facade
//!
//! `Indexer` is the interface shared by all indexers of a search host.
//! Only the full-text indexer lives in this crate; the structured lookup
//! hooks are meant for field-oriented indexers and default to empty.

mod full_text;

pub use full_text::{FullTextIndexer, INDEX_NAME};

use crate::error::Result;
use crate::models::{DocumentId, IndexableDocument, MatchMode, ResultElement, ResultSet};

pub trait Indexer: Send + Sync {
    /// Name under which the host registers this indexer
    fn index_name(&self) -> &str;

    /// Add or replace the postings of a document
    fn index(&self, document: &dyn IndexableDocument, doc_number: DocumentId) -> Result<()>;

    /// Soft-delete a document
    fn delete_document(&self, doc_number: DocumentId) -> Result<()>;

    fn process_query(&self, query: &str, mode: MatchMode) -> Result<ResultSet>;

    /// Structured index entries of the given documents
    fn index_entries(&self, _doc_numbers: &[DocumentId]) -> Vec<ResultElement> {
        Vec::new()
    }

    fn thesaurus_lookup(&self, _query: &str) -> Vec<String> {
        Vec::new()
    }

    /// Flush outstanding writes and release resources
    fn shutdown(&self);
}
