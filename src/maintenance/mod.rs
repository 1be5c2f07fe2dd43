//! Write-behind maintenance of posting files
//!
//! Foreground indexing only touches memory. New tail entries are queued
//! per term and appended later; lists whose order or payload changed are
//! queued for a full rewrite. A single background thread drains both
//! queues one unit at a time.

mod drain;
mod queues;
mod worker;

use std::fmt;

pub use drain::WriteBehind;
pub use queues::{DirtyTermSet, PendingEntries, PendingEntryQueue};
pub use worker::MaintenanceWorker;

/// Queue depths reported by the status hook
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaintenanceStatus {
    /// Posting lists waiting for a full rewrite
    pub dirty: usize,
    /// Terms with entries waiting to be appended
    pub pending: usize,
}

impl MaintenanceStatus {
    pub fn is_idle(&self) -> bool {
        self.dirty == 0 && self.pending == 0
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FullTextIndexUpdater: {} index files to sort, {} ones to update",
            self.dirty, self.pending
        )
    }
}
