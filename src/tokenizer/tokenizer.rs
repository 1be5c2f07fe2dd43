use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::TokenizerConfig;
use crate::models::{IndexableDocument, MatchMode, TextDocument};

/// Coarse token classes; only words and numbers can become terms
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Number,
    Other,
}

impl TokenKind {
    pub fn of(token: &str) -> Self {
        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            return TokenKind::Other;
        };
        if token.chars().all(char::is_alphabetic) {
            TokenKind::Word
        } else if first.is_numeric()
            && token.chars().all(|c| c.is_numeric() || c == '.' || c == ',')
        {
            TokenKind::Number
        } else {
            TokenKind::Other
        }
    }
}

/// Terms of one document with their in-document counts
#[derive(Clone, Debug, Default)]
pub struct IndexTerms {
    /// Distinct terms in first-occurrence order
    pub terms: Vec<(String, u32)>,
    /// Token count of the whole document
    pub doc_length: usize,
}

/// Turns raw tokens into index terms
///
/// Folding lowercases and strips diacritics; stemming then runs until the
/// term stops getting shorter, so that e.g. "generalizations" and
/// "general" collapse onto the same term.
pub struct TermNormalizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl TermNormalizer {
    /// Create a normalizer; stop words are folded on the way in
    pub fn new<I, S>(config: &TokenizerConfig, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stemmer = if config.stem {
            Some(Stemmer::create(stemmer_algorithm(&config.language)))
        } else {
            None
        };

        let stopwords = stopwords
            .into_iter()
            .map(|s| Self::fold(s.as_ref().trim()))
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// Lowercase, then strip combining marks
    pub fn fold(token: &str) -> String {
        token
            .to_lowercase()
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect()
    }

    /// Fold, then stem to a fixed point
    pub fn normalize(&self, token: &str) -> String {
        self.stem(Self::fold(token))
    }

    fn stem(&self, mut term: String) -> String {
        let Some(stemmer) = &self.stemmer else {
            return term;
        };
        let mut len = term.chars().count();
        loop {
            term = stemmer.stem(&term).into_owned();
            let stemmed_len = term.chars().count();
            if stemmed_len < len {
                len = stemmed_len;
            } else {
                return term;
            }
        }
    }

    /// Classify, filter and normalize a single token
    ///
    /// `bounded` applies the upper length limit to words, which only
    /// matters at index time.
    fn accept(&self, token: &str, min_length: usize, bounded: bool) -> Option<String> {
        let len = token.chars().count();
        if len < min_length.max(1) {
            return None;
        }
        let term = match TokenKind::of(token) {
            TokenKind::Word => {
                if bounded && len > self.config.max_term_length {
                    return None;
                }
                let folded = Self::fold(token);
                if self.stopwords.contains(&folded) {
                    return None;
                }
                self.stem(folded)
            }
            TokenKind::Number => self.normalize(token),
            TokenKind::Other => return None,
        };
        // stemming may cut below the trigram size
        (term.chars().count() >= min_length.max(1)).then_some(term)
    }

    /// Extract terms with per-document frequencies
    pub fn extract_index_terms(&self, doc: &dyn IndexableDocument) -> IndexTerms {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut terms: Vec<(String, u32)> = Vec::new();

        for token in doc.tokens() {
            let Some(term) = self.accept(token, self.config.min_term_length, true) else {
                continue;
            };
            match positions.get(&term) {
                Some(&pos) => terms[pos].1 += 1,
                None => {
                    positions.insert(term.clone(), terms.len());
                    terms.push((term, 1));
                }
            }
        }

        IndexTerms {
            terms,
            doc_length: doc.size(),
        }
    }

    /// Extract distinct query terms in first-seen order
    ///
    /// Wildcard modes keep fragments shorter than the minimum term
    /// length, since they may still be a prefix or infix of real terms.
    pub fn extract_query_terms(&self, text: &str, mode: MatchMode) -> Vec<String> {
        let min_length = match mode {
            MatchMode::Exact => self.config.min_term_length,
            MatchMode::Prefix | MatchMode::Infix => 1,
        };
        let doc = TextDocument::new(text);
        let mut seen = HashSet::new();
        doc.tokens()
            .filter_map(|token| self.accept(token, min_length, false))
            .filter(|term| seen.insert(term.clone()))
            .collect()
    }
}

fn stemmer_algorithm(language: &str) -> Algorithm {
    match language.to_lowercase().as_str() {
        "german" => Algorithm::German,
        "french" => Algorithm::French,
        "spanish" => Algorithm::Spanish,
        "italian" => Algorithm::Italian,
        "portuguese" => Algorithm::Portuguese,
        "dutch" => Algorithm::Dutch,
        _ => Algorithm::English,
    }
}
