use parking_lot::{Mutex, MutexGuard};

use crate::models::{DocumentId, InsertOutcome, PostingEntry};

/// Fixed growth step of the posting array; lists see many small updates
/// rather than bulk loads, so linear growth wastes less memory
pub const CAPACITY_INCREMENT: usize = 16;

/// Sorted posting array of one term, only reachable through `TermIndex::lock`
#[derive(Debug, Default)]
pub struct PostingArray {
    entries: Vec<PostingEntry>,
    /// Mirrors membership in the dirty set; set when only a full rewrite
    /// can bring the file up to date
    dirty: bool,
}

impl PostingArray {
    fn new() -> Self {
        Self {
            entries: Vec::with_capacity(CAPACITY_INCREMENT),
            dirty: false,
        }
    }

    /// Insert keeping ascending doc order and no duplicates
    ///
    /// Appends are the fast path. A document already present gets its
    /// payload replaced in place. Anything else is appended and bubbled
    /// backwards once; only the new tail can be out of place.
    pub fn insert(&mut self, entry: PostingEntry) -> InsertOutcome {
        if let Some(last) = self.entries.last() {
            if last.doc_number >= entry.doc_number {
                if let Some(pos) = self.find(entry.doc_number) {
                    if self.entries[pos].differs_from(&entry) {
                        self.entries[pos] = entry;
                        return InsertOutcome::Updated;
                    }
                    return InsertOutcome::Unchanged;
                }
            }
        }

        if self.entries.len() == self.entries.capacity() {
            self.entries.reserve_exact(CAPACITY_INCREMENT);
        }
        self.entries.push(entry);

        let mut moved = false;
        let mut i = self.entries.len() - 1;
        while i > 0 && self.entries[i - 1].doc_number > self.entries[i].doc_number {
            self.entries.swap(i - 1, i);
            moved = true;
            i -= 1;
        }

        if moved {
            InsertOutcome::Reordered
        } else {
            InsertOutcome::Appended
        }
    }

    pub fn find(&self, doc_number: DocumentId) -> Option<usize> {
        self.entries
            .binary_search_by_key(&doc_number, |e| e.doc_number)
            .ok()
    }

    pub fn entries(&self) -> &[PostingEntry] {
        &self.entries
    }

    /// Drop entries rejected by `keep`; only called ahead of a full rewrite
    pub fn retain(&mut self, keep: impl FnMut(&PostingEntry) -> bool) {
        self.entries.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag for rewrite; returns false if it already was
    pub fn mark_dirty(&mut self) -> bool {
        !std::mem::replace(&mut self.dirty, true)
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Posting list of a single term
///
/// Shared between foreground indexing, query evaluation and the
/// maintenance thread; all access goes through the per-instance lock.
#[derive(Debug)]
pub struct TermIndex {
    term: String,
    state: Mutex<PostingArray>,
}

impl TermIndex {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            state: Mutex::new(PostingArray::new()),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Lock the posting array for a compound operation
    pub fn lock(&self) -> MutexGuard<'_, PostingArray> {
        self.state.lock()
    }

    pub fn insert(&self, entry: PostingEntry) -> InsertOutcome {
        self.state.lock().insert(entry)
    }

    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().is_dirty()
    }

    /// Copy of the current entries
    pub fn snapshot(&self) -> Vec<PostingEntry> {
        self.state.lock().entries().to_vec()
    }

    pub fn get(&self, doc_number: DocumentId) -> Option<PostingEntry> {
        let state = self.state.lock();
        state.find(doc_number).map(|pos| state.entries()[pos])
    }
}
