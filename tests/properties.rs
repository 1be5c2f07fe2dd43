mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::{index, query, setup};
use ftdex::postings::TermIndex;
use ftdex::{Indexer, MatchMode, PostingEntry, TextDocument};
use proptest::prelude::*;

const WORDS: &[&str] = &[
    "abacus", "abbey", "able", "about", "cabbage", "kebab", "zebra", "absent",
];

#[test]
fn never_indexed_term_is_empty() {
    let (_tmp, indexer) = setup();
    index(&indexer, 1, "apple banana");
    assert!(query(&indexer, "durian", MatchMode::Exact).is_empty());
    assert!(query(&indexer, "durian", MatchMode::Prefix).is_empty());
}

#[test]
fn indexed_term_round_trips_with_full_score() {
    let (_tmp, indexer) = setup();
    index(&indexer, 42, "some quick brown text");
    let result = indexer.process_query("quick", MatchMode::Exact).unwrap();
    assert_eq!(result.doc_numbers(), vec![42]);
    assert_eq!(result.score(42), Some(1.0));
}

#[test]
fn prefix_query_unites_exactly_the_matching_terms() {
    let (_tmp, indexer) = setup();
    for (doc, word) in WORDS.iter().enumerate() {
        index(&indexer, doc as u64, word);
    }
    let expected: Vec<u64> = WORDS
        .iter()
        .enumerate()
        .filter(|(_, w)| w.starts_with("ab"))
        .map(|(doc, _)| doc as u64)
        .collect();
    assert_eq!(query(&indexer, "ab", MatchMode::Prefix), expected);

    let expected_infix: Vec<u64> = WORDS
        .iter()
        .enumerate()
        .filter(|(_, w)| w.contains("bab"))
        .map(|(doc, _)| doc as u64)
        .collect();
    assert_eq!(query(&indexer, "bab", MatchMode::Infix), expected_infix);
}

#[test]
fn reload_reproduces_written_entries() {
    let (_tmp, indexer) = setup();
    for doc in [9u64, 2, 5, 1, 7] {
        let text = format!("{} filler", "apple ".repeat(doc as usize));
        indexer.index(&TextDocument::new(text), doc).unwrap();
    }
    let before = indexer.term_index("apple").snapshot();
    assert_eq!(before.len(), 5);

    indexer.flush().unwrap();
    indexer.clear_cache();
    let after = indexer.term_index("apple").snapshot();

    assert_eq!(before, after);
    assert_eq!(after[0], PostingEntry::from_counts(1, 1, 2));
    assert_eq!(after[4], PostingEntry::from_counts(9, 9, 10));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn term_index_stays_sorted_and_unique(docs in prop::collection::vec(0u64..200, 0..120)) {
        let index = TermIndex::new("apple");
        for doc in &docs {
            index.insert(PostingEntry::new(*doc, 1, 1));
        }
        let entries = index.snapshot();
        prop_assert!(entries.windows(2).all(|w| w[0].doc_number < w[1].doc_number));

        let expected: BTreeSet<u64> = docs.iter().copied().collect();
        let actual: BTreeSet<u64> = entries.iter().map(|e| e.doc_number).collect();
        prop_assert_eq!(actual, expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn conjunction_is_intersection(
        docs in prop::collection::vec(prop::sample::subsequence(WORDS.to_vec(), 1..4), 1..12),
        a in prop::sample::select(WORDS.to_vec()),
        b in prop::sample::select(WORDS.to_vec()),
    ) {
        let (_tmp, indexer) = setup();
        let mut postings: BTreeMap<&str, BTreeSet<u64>> = BTreeMap::new();
        for (doc, words) in docs.iter().enumerate() {
            index(&indexer, doc as u64, &words.join(" "));
            for word in words {
                postings.entry(*word).or_default().insert(doc as u64);
            }
        }

        let empty = BTreeSet::new();
        let expected: Vec<u64> = postings
            .get(a)
            .unwrap_or(&empty)
            .intersection(postings.get(b).unwrap_or(&empty))
            .copied()
            .collect();
        let actual = query(&indexer, &format!("{} {}", a, b), MatchMode::Exact);
        prop_assert_eq!(actual, expected);
    }
}
