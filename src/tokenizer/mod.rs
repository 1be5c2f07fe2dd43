//! Term extraction: token classification, stop words, folding and stemming.

mod stopwords;
#[allow(clippy::module_inception)]
mod tokenizer;

pub use stopwords::{builtin_stop_words, load_stop_words};
pub use tokenizer::{IndexTerms, TermNormalizer, TokenKind};
