use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::Indexer;
use crate::cache::TermIndexCache;
use crate::config::IndexerConfig;
use crate::error::{FtdexError, Result};
use crate::invalidated::InvalidatedDocumentSet;
use crate::maintenance::{MaintenanceStatus, MaintenanceWorker, PendingEntries, WriteBehind};
use crate::metrics::IndexerMetrics;
use crate::models::{
    DocumentId, IndexableDocument, InsertOutcome, MatchMode, PostingEntry, ResultSet,
};
use crate::postings::{PostingStore, TermIndex};
use crate::query::{PostingAccessor, QueryEvaluator};
use crate::tokenizer::{builtin_stop_words, load_stop_words, TermNormalizer};
use crate::trigram::TrigramIndex;

pub const INDEX_NAME: &str = "fullText";

/// File-backed full-text indexer
///
/// Indexing only updates memory and queues file work for the
/// maintenance thread. Queries read posting lists through the cache,
/// loading them on a miss.
pub struct FullTextIndexer {
    config: IndexerConfig,
    normalizer: TermNormalizer,
    trigrams: TrigramIndex,
    cache: TermIndexCache,
    write_behind: Arc<WriteBehind>,
    invalidated: Arc<InvalidatedDocumentSet>,
    metrics: IndexerMetrics,
    worker: Mutex<Option<MaintenanceWorker>>,
    closed: AtomicBool,
}

impl FullTextIndexer {
    /// Open the index under the configured root and start maintenance
    pub fn open(config: IndexerConfig) -> Result<Self> {
        config.validate()?;
        let root = config.index_root();
        info!("opening full-text index at {:?}", root);

        let store = PostingStore::open(&root)?;
        let stopwords = Self::stop_words(&config)?;
        let normalizer = TermNormalizer::new(&config.tokenizer, &stopwords);
        let invalidated = Arc::new(InvalidatedDocumentSet::load(&root)?);

        let vocabulary = store.scan_terms()?;
        let trigrams = TrigramIndex::from_terms(&vocabulary);
        info!(
            "got {} trigrams from {} index terms",
            trigrams.len(),
            vocabulary.len()
        );

        let metrics = IndexerMetrics::new()?;
        let write_behind = Arc::new(WriteBehind::new(store, invalidated.clone()));
        let worker =
            MaintenanceWorker::spawn(write_behind.clone(), metrics.clone(), &config.maintenance)?;

        Ok(Self {
            cache: TermIndexCache::new(config.term_index_cache_limit),
            config,
            normalizer,
            trigrams,
            write_behind,
            invalidated,
            metrics,
            worker: Mutex::new(Some(worker)),
            closed: AtomicBool::new(false),
        })
    }

    fn stop_words(config: &IndexerConfig) -> Result<Vec<String>> {
        let path = config.stop_words_path();
        match load_stop_words(&path) {
            Ok(words) => {
                info!("loaded {} stop words from {:?}", words.len(), path);
                Ok(words)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if config.fallback_stopwords {
                    warn!(
                        "stop word file {:?} not found, using built-in {} list",
                        path, config.tokenizer.language
                    );
                    Ok(builtin_stop_words(&config.tokenizer.language))
                } else {
                    warn!("stop word file {:?} not found, indexing without stop words", path);
                    Ok(Vec::new())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &IndexerMetrics {
        &self.metrics
    }

    /// Queue depths of the maintenance thread
    pub fn status(&self) -> MaintenanceStatus {
        self.write_behind.status()
    }

    /// Write all queued file work in the calling thread
    pub fn flush(&self) -> Result<usize> {
        let units = self.write_behind.drain_all()?;
        self.metrics.set_status(&self.status());
        Ok(units)
    }

    /// Drop every cached posting list; the next access reloads from disk
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.metrics.set_cache_size(0);
    }

    pub fn cached_terms(&self) -> usize {
        self.cache.len()
    }

    pub fn invalidated_count(&self) -> usize {
        self.invalidated.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(FtdexError::ShutDown);
        }
        Ok(())
    }

    /// Posting list of `term`, from the cache or loaded on a miss
    ///
    /// A miss holds the pending lock until the list is cached, so that
    /// every entry ends up either merged here or queued after publication.
    pub fn term_index(&self, term: &str) -> Arc<TermIndex> {
        if let Some(index) = self.cache.get(term) {
            return index;
        }

        let mut pending = self.write_behind.pending().lock();
        if let Some(index) = self.cached(term, &mut pending) {
            return index;
        }
        let index = self.load_term_index(term);
        self.publish(&index, &mut pending);
        index
    }

    /// Cached list of `term`, reviving one still waiting for a rewrite
    fn cached(&self, term: &str, pending: &mut PendingEntries) -> Option<Arc<TermIndex>> {
        if let Some(index) = self.cache.get(term) {
            return Some(index);
        }
        let index = self.write_behind.dirty().get(term)?;
        debug!("reviving dirty index for '{}'", term);
        self.publish(&index, pending);
        Some(index)
    }

    fn publish(&self, index: &Arc<TermIndex>, pending: &mut PendingEntries) {
        self.merge_pending(index, pending);
        if let Some(evicted) = self.cache.insert(index.clone()) {
            debug!("evicted '{}' from the posting list cache", evicted.term());
        }
        self.metrics.set_cache_size(self.cache.len());
    }

    fn load_term_index(&self, term: &str) -> Arc<TermIndex> {
        let index = Arc::new(TermIndex::new(term));
        let mut state = index.lock();
        let mut needs_rewrite = false;

        let loaded = self.write_behind.store().load(term, |entry| {
            if self.invalidated.contains(entry.doc_number) {
                needs_rewrite = true;
            } else if state.insert(entry) != InsertOutcome::Appended {
                needs_rewrite = true;
            }
        });

        match loaded {
            Ok(count) => debug!("loaded {} entries for '{}'", count, term),
            Err(e) => {
                // a rewrite of a partial list would lose postings
                error!("failed to load index file for '{}': {}", term, e);
                state.retain(|_| false);
                needs_rewrite = false;
            }
        }

        if needs_rewrite && state.mark_dirty() {
            self.write_behind.dirty().insert(index.clone());
        }
        drop(state);
        index
    }

    /// Fold queued entries of the index's term into a freshly loaded list
    fn merge_pending(&self, index: &Arc<TermIndex>, pending: &mut PendingEntries) {
        let term = index.term();
        let Some(queued) = pending.get(term).map(<[PostingEntry]>::to_vec) else {
            return;
        };

        let mut state = index.lock();
        let mut needs_rewrite = state.is_dirty();
        // one flag per queued position; a repeated entry is Unchanged the
        // second time and must not be appended again
        let mut appended = Vec::with_capacity(queued.len());
        for entry in queued {
            let outcome = state.insert(entry);
            needs_rewrite |= outcome.requires_rewrite();
            appended.push(outcome == InsertOutcome::Appended);
        }

        if needs_rewrite {
            // the rewrite covers everything queued
            pending.remove(term);
            if state.mark_dirty() {
                self.write_behind.dirty().insert(index.clone());
            }
        } else {
            let mut keep = appended.into_iter();
            pending.retain(term, |_| keep.next().unwrap_or(false));
        }
    }

    fn index_term(&self, term: &str, entry: PostingEntry) {
        let mut pending = self.write_behind.pending().lock();
        let Some(index) = self.cached(term, &mut pending) else {
            pending.push(term, entry);
            return;
        };

        let mut state = index.lock();
        let outcome = state.insert(entry);
        if outcome.requires_rewrite() {
            pending.remove(term);
            if state.mark_dirty() {
                self.write_behind.dirty().insert(index.clone());
            }
        } else if outcome == InsertOutcome::Appended && !state.is_dirty() {
            pending.push(term, entry);
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("shutting down full-text index: {}", self.status());

        if let Some(mut worker) = self.worker.lock().take() {
            worker.shutdown();
        }
        self.write_behind.drain_all_logged();
        self.metrics.set_status(&self.status());

        if let Err(e) = self.invalidated.persist() {
            error!("failed to store invalidated documents: {}", e);
        }
        info!("full-text index shut down");
    }
}

impl Indexer for FullTextIndexer {
    fn index_name(&self) -> &str {
        INDEX_NAME
    }

    fn index(&self, document: &dyn IndexableDocument, doc_number: DocumentId) -> Result<()> {
        self.ensure_open()?;
        self.invalidated.remove(doc_number);
        if document.is_empty() {
            return Ok(());
        }

        let extracted = self.normalizer.extract_index_terms(document);
        for (term, count) in &extracted.terms {
            let entry = PostingEntry::from_counts(doc_number, *count, extracted.doc_length);
            self.trigrams.register(term);
            self.index_term(term, entry);
        }

        self.metrics.record_index();
        debug!(
            "indexed document {} with {} terms",
            doc_number,
            extracted.terms.len()
        );
        Ok(())
    }

    fn delete_document(&self, doc_number: DocumentId) -> Result<()> {
        self.ensure_open()?;
        if self.invalidated.add(doc_number) {
            self.metrics.record_delete();
            debug!("invalidated document {}", doc_number);
        }
        Ok(())
    }

    fn process_query(&self, query: &str, mode: MatchMode) -> Result<ResultSet> {
        self.ensure_open()?;
        let start = Instant::now();
        let result = QueryEvaluator::new(&self.normalizer, self).evaluate(query, mode);
        self.metrics.record_query(mode, start.elapsed().as_secs_f64());
        Ok(result)
    }

    fn shutdown(&self) {
        self.close();
    }
}

impl PostingAccessor for FullTextIndexer {
    fn postings(&self, term: &str) -> Vec<PostingEntry> {
        self.term_index(term).snapshot()
    }

    fn expand(&self, fragment: &str, mode: MatchMode) -> Vec<String> {
        self.trigrams.resolve(fragment, mode)
    }

    fn is_invalidated(&self, doc_number: DocumentId) -> bool {
        self.invalidated.contains(doc_number)
    }
}

impl Drop for FullTextIndexer {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for FullTextIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullTextIndexer")
            .field("root", &self.config.index_root())
            .field("cache", &self.cache)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaintenanceConfig;
    use crate::models::TextDocument;
    use tempfile::TempDir;

    /// Maintenance slow enough that tests control all file work
    fn open(tmp: &TempDir) -> FullTextIndexer {
        let mut config = IndexerConfig::new(tmp.path())
            .with_fallback_stopwords(false)
            .with_maintenance(MaintenanceConfig {
                idle_interval_ms: 60_000,
                drain_pause_ms: 60_000,
            });
        config.tokenizer.stem = false;
        FullTextIndexer::open(config).unwrap()
    }

    fn index(indexer: &FullTextIndexer, doc: DocumentId, text: &str) {
        indexer.index(&TextDocument::new(text), doc).unwrap();
    }

    fn on_disk(indexer: &FullTextIndexer, term: &str) -> Vec<DocumentId> {
        let mut docs = Vec::new();
        indexer
            .write_behind
            .store()
            .load(term, |e| docs.push(e.doc_number))
            .unwrap();
        docs
    }

    #[test]
    fn test_uncached_terms_are_queued() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        index(&indexer, 1, "apple banana");

        assert_eq!(indexer.status(), MaintenanceStatus { dirty: 0, pending: 2 });
        assert_eq!(indexer.flush().unwrap(), 2);
        assert!(indexer.status().is_idle());
    }

    #[test]
    fn test_cached_append_is_queued_once() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        index(&indexer, 1, "apple");
        indexer.term_index("apple");
        // merged into the loaded list but still queued for the file
        assert_eq!(indexer.status().pending, 1);

        index(&indexer, 2, "apple");
        indexer.flush().unwrap();
        indexer.clear_cache();

        let docs: Vec<_> = indexer
            .term_index("apple")
            .snapshot()
            .iter()
            .map(|e| e.doc_number)
            .collect();
        assert_eq!(docs, vec![1, 2]);
        assert!(indexer.status().is_idle());
    }

    #[test]
    fn test_out_of_order_insert_marks_dirty() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        index(&indexer, 5, "apple");
        indexer.flush().unwrap();

        indexer.term_index("apple");
        index(&indexer, 3, "apple");
        assert_eq!(indexer.status(), MaintenanceStatus { dirty: 1, pending: 0 });

        indexer.flush().unwrap();
        assert_eq!(on_disk(&indexer, "apple"), vec![3, 5]);
    }

    #[test]
    fn test_repeated_queued_entry_is_written_once() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        index(&indexer, 1, "apple");
        index(&indexer, 1, "apple");

        let loaded = indexer.term_index("apple");
        assert_eq!(loaded.len(), 1);
        assert_eq!(indexer.status(), MaintenanceStatus { dirty: 0, pending: 1 });

        indexer.flush().unwrap();
        assert_eq!(on_disk(&indexer, "apple"), vec![1]);
    }

    #[test]
    fn test_indexing_revives_evicted_dirty_index() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        index(&indexer, 5, "apple");
        indexer.term_index("apple");
        index(&indexer, 3, "apple");
        indexer.clear_cache();

        // the rewrite of the revived list covers the new entry
        index(&indexer, 7, "apple");
        assert_eq!(indexer.status(), MaintenanceStatus { dirty: 1, pending: 0 });
        assert_eq!(indexer.cached_terms(), 1);

        indexer.flush().unwrap();
        assert_eq!(on_disk(&indexer, "apple"), vec![3, 5, 7]);
    }

    #[test]
    fn test_unreadable_list_loads_empty_and_retries_writes() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        let blocker = indexer.config().index_root().join("a");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let loaded = indexer.term_index("apple");
        assert!(loaded.is_empty());
        assert!(!loaded.is_dirty());

        index(&indexer, 1, "apple");
        assert!(indexer.flush().is_err());
        assert_eq!(indexer.status(), MaintenanceStatus { dirty: 0, pending: 1 });

        std::fs::remove_file(&blocker).unwrap();
        assert_eq!(indexer.flush().unwrap(), 1);
        assert_eq!(on_disk(&indexer, "apple"), vec![1]);
    }

    #[test]
    fn test_dirty_index_is_revived_after_eviction() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        index(&indexer, 5, "apple");
        indexer.term_index("apple");
        index(&indexer, 3, "apple");
        indexer.clear_cache();

        let revived = indexer.term_index("apple");
        assert!(revived.is_dirty());
        assert_eq!(revived.len(), 2);
    }

    #[test]
    fn test_closed_indexer_rejects_calls() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        indexer.shutdown();
        assert!(indexer.is_closed());
        assert!(matches!(
            indexer.process_query("apple", MatchMode::Exact),
            Err(FtdexError::ShutDown)
        ));
        assert!(matches!(indexer.delete_document(1), Err(FtdexError::ShutDown)));
    }

    #[test]
    fn test_structured_hooks_are_empty() {
        let tmp = TempDir::new().unwrap();
        let indexer = open(&tmp);
        assert_eq!(indexer.index_name(), INDEX_NAME);
        assert!(indexer.index_entries(&[1, 2]).is_empty());
        assert!(indexer.thesaurus_lookup("apple").is_empty());
    }
}
