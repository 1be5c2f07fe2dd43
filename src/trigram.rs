//! Trigram index over the term vocabulary
//!
//! Maps every 3-char substring of a known term to the terms containing
//! it. Prefix and infix lookups intersect the sets of the query's
//! trigrams and then verify the survivors, since sharing all trigrams
//! does not imply containing the string. Fragments shorter than a
//! trigram are looked up among the trigram keys containing them.

use dashmap::DashMap;
use std::collections::HashSet;

use crate::models::MatchMode;

const TRIGRAM_LEN: usize = 3;

/// All trigrams of `term` in order, by chars; empty below three chars
pub fn trigrams(term: &str) -> Vec<String> {
    let chars: Vec<char> = term.chars().collect();
    if chars.len() < TRIGRAM_LEN {
        return Vec::new();
    }
    chars
        .windows(TRIGRAM_LEN)
        .map(|w| w.iter().collect())
        .collect()
}

#[derive(Debug, Default)]
pub struct TrigramIndex {
    trigrams: DashMap<String, HashSet<String>>,
}

impl TrigramIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a vocabulary, e.g. the terms found in the posting store
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = Self::new();
        for term in terms {
            index.register(term.as_ref());
        }
        index
    }

    /// Add a term under each of its trigrams
    pub fn register(&self, term: &str) {
        for trigram in trigrams(term) {
            let mut terms = self.trigrams.entry(trigram).or_default();
            if !terms.contains(term) {
                terms.insert(term.to_string());
            }
        }
    }

    /// Number of distinct trigrams
    pub fn len(&self) -> usize {
        self.trigrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trigrams.is_empty()
    }

    /// Vocabulary terms matching `s` under `mode`, sorted
    ///
    /// Exact mode is not served from trigrams and yields nothing here;
    /// callers look the term up directly.
    pub fn resolve(&self, s: &str, mode: MatchMode) -> Vec<String> {
        if mode == MatchMode::Exact || s.is_empty() {
            return Vec::new();
        }

        let candidates = if s.chars().count() < TRIGRAM_LEN {
            self.fragment_candidates(s)
        } else {
            self.trigram_candidates(s)
        };

        let mut matches: Vec<String> = candidates
            .into_iter()
            .filter(|candidate| mode.matches(candidate, s))
            .collect();
        matches.sort();
        matches
    }

    /// Intersection of the term sets of all trigrams of `s`
    fn trigram_candidates(&self, s: &str) -> HashSet<String> {
        let mut candidates: Option<HashSet<String>> = None;
        for trigram in trigrams(s) {
            let Some(terms) = self.trigrams.get(&trigram) else {
                return HashSet::new();
            };
            candidates = Some(match candidates {
                None => terms.clone(),
                Some(mut current) => {
                    current.retain(|t| terms.contains(t));
                    current
                }
            });
            if candidates.as_ref().is_some_and(HashSet::is_empty) {
                return HashSet::new();
            }
        }
        candidates.unwrap_or_default()
    }

    /// Terms under any trigram containing the fragment `s`
    fn fragment_candidates(&self, s: &str) -> HashSet<String> {
        let mut candidates = HashSet::new();
        for entry in self.trigrams.iter() {
            if entry.key().contains(s) {
                candidates.extend(entry.value().iter().cloned());
            }
        }
        candidates
    }
}
