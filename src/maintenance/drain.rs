use std::sync::Arc;

use tracing::{debug, error, warn};

use super::queues::{DirtyTermSet, PendingEntryQueue};
use super::MaintenanceStatus;
use crate::error::Result;
use crate::invalidated::InvalidatedDocumentSet;
use crate::postings::PostingStore;

/// State shared between foreground indexing and the maintenance thread
#[derive(Debug)]
pub struct WriteBehind {
    store: PostingStore,
    pending: PendingEntryQueue,
    dirty: DirtyTermSet,
    invalidated: Arc<InvalidatedDocumentSet>,
}

impl WriteBehind {
    pub fn new(store: PostingStore, invalidated: Arc<InvalidatedDocumentSet>) -> Self {
        Self {
            store,
            pending: PendingEntryQueue::new(),
            dirty: DirtyTermSet::new(),
            invalidated,
        }
    }

    pub fn store(&self) -> &PostingStore {
        &self.store
    }

    pub fn pending(&self) -> &PendingEntryQueue {
        &self.pending
    }

    pub fn dirty(&self) -> &DirtyTermSet {
        &self.dirty
    }

    pub fn status(&self) -> MaintenanceStatus {
        MaintenanceStatus {
            dirty: self.dirty.len(),
            pending: self.pending.len(),
        }
    }

    /// Rewrite the oldest dirty posting list
    ///
    /// Runs entirely under the list's lock. Invalidated documents are
    /// purged from memory and file alike. The list leaves the dirty set
    /// only after the new file is written.
    pub fn drain_dirty_unit(&self) -> Result<bool> {
        let Some(index) = self.dirty.front() else {
            return Ok(false);
        };

        let mut state = index.lock();
        state.clear_dirty();
        state.retain(|e| !self.invalidated.contains(e.doc_number));

        match self.store.rewrite(index.term(), state.entries()) {
            Ok(written) => {
                self.dirty.remove(&index);
                debug!("sorted index file for '{}' ({} entries)", index.term(), written);
                Ok(true)
            }
            Err(e) => {
                state.mark_dirty();
                self.dirty.rotate();
                error!("failed to rewrite index file for '{}': {}", index.term(), e);
                Err(e)
            }
        }
    }

    /// Append the queued entries of the oldest pending term
    ///
    /// Holds the pending lock for the write so that a concurrent load
    /// either sees the entries on disk or still in the queue.
    pub fn drain_pending_unit(&self) -> Result<bool> {
        let mut pending = self.pending.lock();
        let Some((term, entries)) = pending.front() else {
            return Ok(false);
        };
        let term = term.to_string();

        match self.store.append(&term, entries) {
            Ok(written) => {
                pending.remove(&term);
                debug!("updated index file for '{}' (+{} entries)", term, written);
                Ok(true)
            }
            Err(e) => {
                pending.rotate();
                error!("failed to update index file for '{}': {}", term, e);
                Err(e)
            }
        }
    }

    /// One unit of work, rewrites first; false when both queues are empty
    pub fn do_work(&self) -> Result<bool> {
        if self.drain_dirty_unit()? {
            return Ok(true);
        }
        self.drain_pending_unit()
    }

    /// Drain both queues in the calling thread
    ///
    /// Stops at the first failure, leaving the failed item queued.
    pub fn drain_all(&self) -> Result<usize> {
        let mut units = 0;
        while self.do_work()? {
            units += 1;
        }
        if units > 0 {
            debug!("drained {} maintenance units", units);
        }
        Ok(units)
    }

    /// Drain, logging instead of returning a failure
    pub fn drain_all_logged(&self) -> usize {
        match self.drain_all() {
            Ok(units) => units,
            Err(e) => {
                warn!("maintenance drain stopped early: {} ({})", e, self.status());
                0
            }
        }
    }
}
