//! File-backed posting lists
//!
//! Every term owns one file `root/c1/c2/c3/idx-<term>` made of fixed
//! 10-byte records sorted by document number. Terms too long for the
//! filesystem are truncated one char at a time until the name fits.
//!
//! # Components
//!
//! - `codec`: record encoding and streaming decode
//! - `TermIndex`: in-memory sorted posting array with its own lock
//! - `PostingStore`: path layout, load, append, rewrite and vocabulary scan

mod codec;
mod store;
mod term_index;

pub use codec::{decode_entries, encode_entry, read_entries, write_entries, RECORD_SIZE};
pub use store::{PostingStore, INDEX_FILE_PREFIX, OLD_FILE_SUFFIX};
pub use term_index::{PostingArray, TermIndex, CAPACITY_INCREMENT};
