//! Bounded cache of loaded posting lists
//!
//! Strict LRU by entry count: every hit promotes, and inserting into a
//! full cache evicts the least recently used term. Evicted lists are
//! simply dropped; anything not yet on disk is still tracked by the
//! pending queue or the dirty set.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::postings::TermIndex;

pub struct TermIndexCache {
    inner: Mutex<LruCache<String, Arc<TermIndex>>>,
    limit: usize,
}

impl TermIndexCache {
    /// Create a cache holding at most `limit` posting lists (minimum 1)
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        let capacity = NonZeroUsize::new(limit).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            limit,
        }
    }

    /// Look up a term and mark it most recently used
    pub fn get(&self, term: &str) -> Option<Arc<TermIndex>> {
        self.inner.lock().get(term).cloned()
    }

    /// Insert a list, returning the evicted one if the cache was full
    pub fn insert(&self, index: Arc<TermIndex>) -> Option<Arc<TermIndex>> {
        let term = index.term().to_string();
        // push also hands back the old value when the key was present
        self.inner
            .lock()
            .push(term.clone(), index)
            .filter(|(evicted, _)| *evicted != term)
            .map(|(_, evicted)| evicted)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TermIndexCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermIndexCache")
            .field("len", &self.len())
            .field("limit", &self.limit)
            .finish()
    }
}
