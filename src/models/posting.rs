use serde::{Deserialize, Serialize};

use super::document::DocumentId;

/// Largest value stored in the single-byte posting fields
pub const MAX_BYTE_VALUE: u8 = 127;

/// One document reference in a term's posting list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingEntry {
    pub doc_number: DocumentId,
    pub term_frequency: u8,
    pub doc_length_log2: u8,
}

impl PostingEntry {
    pub fn new(doc_number: DocumentId, term_frequency: u8, doc_length_log2: u8) -> Self {
        Self {
            doc_number,
            term_frequency,
            doc_length_log2,
        }
    }

    /// Build an entry from raw counts, capping both byte fields
    pub fn from_counts(doc_number: DocumentId, term_count: u32, doc_length: usize) -> Self {
        Self {
            doc_number,
            term_frequency: term_count.min(MAX_BYTE_VALUE as u32) as u8,
            doc_length_log2: length_log2(doc_length),
        }
    }

    /// Whether `other` carries different payload for the same document
    pub fn differs_from(&self, other: &PostingEntry) -> bool {
        self.term_frequency != other.term_frequency
            || self.doc_length_log2 != other.doc_length_log2
    }
}

/// `floor(log2(len))`, capped to a byte; empty documents map to 0
pub fn length_log2(len: usize) -> u8 {
    if len == 0 {
        return 0;
    }
    (usize::BITS - 1 - len.leading_zeros()).min(MAX_BYTE_VALUE as u32) as u8
}

/// Result of inserting an entry into a sorted posting list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Appended at the tail, order preserved; safe to append to the file
    Appended,
    /// Appended and moved backwards; the file needs a full rewrite
    Reordered,
    /// Existing entry for the document got new payload; needs a rewrite
    Updated,
    /// Identical entry already present
    Unchanged,
}

impl InsertOutcome {
    /// Whether the on-disk copy can no longer be brought up to date by appending
    pub fn requires_rewrite(self) -> bool {
        matches!(self, InsertOutcome::Reordered | InsertOutcome::Updated)
    }
}
