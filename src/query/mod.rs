//! Free-text query evaluation
//!
//! Query text runs through the same normalization as indexed text. Terms
//! are then matched exactly or, in prefix and infix mode, expanded over
//! the vocabulary through the trigram index.

mod accessor;
mod evaluator;

pub use accessor::PostingAccessor;
pub use evaluator::{QueryEvaluator, MATCH_SCORE};
