use parking_lot::{Mutex, MutexGuard};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::models::PostingEntry;
use crate::postings::TermIndex;

/// Entries accepted by `index` but not yet appended to their files
#[derive(Debug, Default)]
pub struct PendingEntryQueue {
    inner: Mutex<PendingEntries>,
}

impl PendingEntryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the queue across a compound operation
    ///
    /// The load path keeps this guard while it reads a posting file and
    /// publishes the result, so no entry can slip in between.
    pub fn lock(&self) -> MutexGuard<'_, PendingEntries> {
        self.inner.lock()
    }

    pub fn push(&self, term: &str, entry: PostingEntry) {
        self.inner.lock().push(term, entry);
    }

    /// Number of terms with queued entries
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Per-term FIFO lists, terms ordered by first enqueue
#[derive(Debug, Default)]
pub struct PendingEntries {
    order: VecDeque<String>,
    entries: HashMap<String, Vec<PostingEntry>>,
}

impl PendingEntries {
    pub fn push(&mut self, term: &str, entry: PostingEntry) {
        match self.entries.get_mut(term) {
            Some(queued) => queued.push(entry),
            None => {
                self.order.push_back(term.to_string());
                self.entries.insert(term.to_string(), vec![entry]);
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<&[PostingEntry]> {
        self.entries.get(term).map(Vec::as_slice)
    }

    /// Keep only the entries accepted by `keep`; drops the term when none remain
    pub fn retain(&mut self, term: &str, keep: impl FnMut(&PostingEntry) -> bool) {
        let Some(queued) = self.entries.get_mut(term) else {
            return;
        };
        queued.retain(keep);
        if queued.is_empty() {
            self.remove(term);
        }
    }

    pub fn remove(&mut self, term: &str) -> Option<Vec<PostingEntry>> {
        let removed = self.entries.remove(term)?;
        self.order.retain(|t| t != term);
        Some(removed)
    }

    /// Oldest term with its queued entries
    pub fn front(&self) -> Option<(&str, &[PostingEntry])> {
        let term = self.order.front()?;
        self.entries
            .get(term)
            .map(|queued| (term.as_str(), queued.as_slice()))
    }

    /// Move the oldest term to the back so a failing one cannot block the rest
    pub fn rotate(&mut self) {
        if let Some(term) = self.order.pop_front() {
            self.order.push_back(term);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Posting lists whose files can only be fixed by a full rewrite
///
/// Members stay in the set until their rewrite succeeded, so a cache miss
/// can always find the newest instance of a term here.
#[derive(Debug, Default)]
pub struct DirtyTermSet {
    inner: Mutex<DirtyIndexes>,
}

#[derive(Debug, Default)]
struct DirtyIndexes {
    order: VecDeque<String>,
    indexes: HashMap<String, Arc<TermIndex>>,
}

impl DirtyTermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the term was already queued
    pub fn insert(&self, index: Arc<TermIndex>) -> bool {
        let mut inner = self.inner.lock();
        if inner.indexes.contains_key(index.term()) {
            return false;
        }
        inner.order.push_back(index.term().to_string());
        inner.indexes.insert(index.term().to_string(), index);
        true
    }

    pub fn get(&self, term: &str) -> Option<Arc<TermIndex>> {
        self.inner.lock().indexes.get(term).cloned()
    }

    pub fn front(&self) -> Option<Arc<TermIndex>> {
        let inner = self.inner.lock();
        let term = inner.order.front()?;
        inner.indexes.get(term).cloned()
    }

    /// Remove `index`, but only if it is still the queued instance of its term
    pub fn remove(&self, index: &Arc<TermIndex>) -> bool {
        let mut inner = self.inner.lock();
        match inner.indexes.get(index.term()) {
            Some(queued) if Arc::ptr_eq(queued, index) => {}
            _ => return false,
        }
        inner.indexes.remove(index.term());
        inner.order.retain(|t| t != index.term());
        true
    }

    pub fn rotate(&self) {
        let mut inner = self.inner.lock();
        if let Some(term) = inner.order.pop_front() {
            inner.order.push_back(term);
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.inner.lock().indexes.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
