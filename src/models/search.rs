use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::document::DocumentId;
use crate::error::FtdexError;

/// How query terms are matched against the vocabulary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Term must equal an indexed term
    Exact,
    /// Term must be a prefix of an indexed term
    #[default]
    Prefix,
    /// Term may occur anywhere inside an indexed term
    Infix,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Prefix => "prefix",
            MatchMode::Infix => "infix",
        }
    }

    /// Check a vocabulary term against a query term under this mode
    pub fn matches(&self, candidate: &str, query_term: &str) -> bool {
        match self {
            MatchMode::Exact => candidate == query_term,
            MatchMode::Prefix => candidate.starts_with(query_term),
            MatchMode::Infix => candidate.contains(query_term),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = FtdexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "prefix" => Ok(MatchMode::Prefix),
            "infix" => Ok(MatchMode::Infix),
            _ => Err(FtdexError::InvalidMatchMode(s.to_string())),
        }
    }
}

/// A matching document with its score
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultElement {
    pub doc_number: DocumentId,
    pub score: f64,
}

/// Set of `(doc_number, score)` pairs keyed by document number
///
/// Union and intersection merge by document number; the caller picks how
/// two scores for the same document are combined.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    elements: BTreeMap<DocumentId, f64>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, keeping the higher score if it is already present
    pub fn insert(&mut self, doc_number: DocumentId, score: f64) {
        self.elements
            .entry(doc_number)
            .and_modify(|s| *s = s.max(score))
            .or_insert(score);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, doc_number: DocumentId) -> bool {
        self.elements.contains_key(&doc_number)
    }

    pub fn score(&self, doc_number: DocumentId) -> Option<f64> {
        self.elements.get(&doc_number).copied()
    }

    /// Document numbers in ascending order
    pub fn doc_numbers(&self) -> Vec<DocumentId> {
        self.elements.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = ResultElement> + '_ {
        self.elements
            .iter()
            .map(|(&doc_number, &score)| ResultElement { doc_number, score })
    }

    /// OR: every document of either side, `max` of the scores
    pub fn union_max(mut self, other: ResultSet) -> ResultSet {
        if self.elements.len() < other.elements.len() {
            return other.union_max(self);
        }
        for (doc_number, score) in other.elements {
            self.insert(doc_number, score);
        }
        self
    }

    /// AND: documents present on both sides, `min` of the scores
    pub fn intersect_min(self, other: &ResultSet) -> ResultSet {
        let elements = self
            .elements
            .into_iter()
            .filter_map(|(doc_number, score)| {
                other
                    .elements
                    .get(&doc_number)
                    .map(|&other_score| (doc_number, score.min(other_score)))
            })
            .collect();
        ResultSet { elements }
    }

    /// Drop documents rejected by the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(DocumentId) -> bool) {
        self.elements.retain(|&doc_number, _| keep(doc_number));
    }
}

impl FromIterator<ResultElement> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ResultElement>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for element in iter {
            set.insert(element.doc_number, element.score);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(u64, f64)]) -> ResultSet {
        pairs
            .iter()
            .map(|&(doc_number, score)| ResultElement { doc_number, score })
            .collect()
    }

    #[test]
    fn test_match_mode_parse() {
        assert_eq!("exact".parse::<MatchMode>().unwrap(), MatchMode::Exact);
        assert_eq!(" Prefix ".parse::<MatchMode>().unwrap(), MatchMode::Prefix);
        assert_eq!("INFIX".parse::<MatchMode>().unwrap(), MatchMode::Infix);
        assert!("fuzzy".parse::<MatchMode>().is_err());
        assert_eq!(MatchMode::default(), MatchMode::Prefix);
    }

    #[test]
    fn test_match_mode_matches() {
        assert!(MatchMode::Prefix.matches("apple", "app"));
        assert!(!MatchMode::Prefix.matches("pineapple", "app"));
        assert!(MatchMode::Infix.matches("pineapple", "app"));
        assert!(!MatchMode::Exact.matches("apples", "apple"));
    }

    #[test]
    fn test_union_keeps_max() {
        let merged = set(&[(1, 0.5), (2, 1.0)]).union_max(set(&[(1, 0.8), (3, 0.2)]));
        assert_eq!(merged.doc_numbers(), vec![1, 2, 3]);
        assert_eq!(merged.score(1), Some(0.8));
        assert_eq!(merged.score(3), Some(0.2));
    }

    #[test]
    fn test_intersection_keeps_min() {
        let joined = set(&[(1, 0.5), (2, 1.0)]).intersect_min(&set(&[(1, 0.8), (3, 0.2)]));
        assert_eq!(joined.doc_numbers(), vec![1]);
        assert_eq!(joined.score(1), Some(0.5));
    }

    #[test]
    fn test_intersection_with_empty() {
        let joined = set(&[(1, 1.0)]).intersect_min(&ResultSet::new());
        assert!(joined.is_empty());
    }
}
