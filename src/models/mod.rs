pub mod document;
pub mod posting;
pub mod search;

pub use document::{DocumentId, IndexableDocument, TextDocument};
pub use posting::{length_log2, InsertOutcome, PostingEntry, MAX_BYTE_VALUE};
pub use search::{MatchMode, ResultElement, ResultSet};
