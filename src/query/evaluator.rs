use tracing::debug;

use super::accessor::PostingAccessor;
use crate::models::{MatchMode, ResultSet};
use crate::tokenizer::TermNormalizer;

/// Score of every matching document; ranking is out of scope
pub const MATCH_SCORE: f64 = 1.0;

/// Evaluates free-text queries as a conjunction of terms
///
/// Every query term contributes one result set; the sets are intersected
/// keeping the lower score. In the wildcard modes a term stands for all
/// vocabulary terms it matches, whose sets are united keeping the higher
/// score.
pub struct QueryEvaluator<'a> {
    normalizer: &'a TermNormalizer,
    accessor: &'a dyn PostingAccessor,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(normalizer: &'a TermNormalizer, accessor: &'a dyn PostingAccessor) -> Self {
        Self {
            normalizer,
            accessor,
        }
    }

    pub fn evaluate(&self, text: &str, mode: MatchMode) -> ResultSet {
        let terms = self.normalizer.extract_query_terms(text, mode);
        if terms.is_empty() {
            return ResultSet::new();
        }

        let mut result: Option<ResultSet> = None;
        for term in &terms {
            let term_result = match mode {
                MatchMode::Exact => self.term_result(term),
                MatchMode::Prefix | MatchMode::Infix => self.wildcard_result(term, mode),
            };
            // nothing can survive the intersection
            if term_result.is_empty() {
                debug!("query term '{}' ({}) matched nothing", term, mode);
                return ResultSet::new();
            }
            let combined = match result {
                None => term_result,
                Some(acc) => acc.intersect_min(&term_result),
            };
            if combined.is_empty() {
                return combined;
            }
            result = Some(combined);
        }
        result.unwrap_or_default()
    }

    fn term_result(&self, term: &str) -> ResultSet {
        let mut result = ResultSet::new();
        for entry in self.accessor.postings(term) {
            if !self.accessor.is_invalidated(entry.doc_number) {
                result.insert(entry.doc_number, MATCH_SCORE);
            }
        }
        result
    }

    fn wildcard_result(&self, fragment: &str, mode: MatchMode) -> ResultSet {
        self.accessor
            .expand(fragment, mode)
            .iter()
            .map(|term| self.term_result(term))
            .fold(ResultSet::new(), ResultSet::union_max)
    }
}
