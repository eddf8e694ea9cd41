//! Behavioural properties of the merge engine over a small learned table.

use runebpe_tokenizer::{BpeEngine, MergeTable, Pair, Symbol};
use std::sync::Arc;

/// Merges in the order a trainer on English text might learn them.
const MERGES: &[(&str, &str)] = &[
    ("e", "r"),
    ("l", "o"),
    ("lo", "w"),
    ("t", "h"),
    ("th", "e"),
    ("i", "n"),
    ("in", "g"),
    ("a", "n"),
    ("an", "d"),
    ("low", "er"),
    ("e", "s"),
    ("es", "t"),
    ("n", "e"),
    ("ne", "w"),
    (" ", "the"),
    ("a", "a"),
];

const WORDS: &[&str] = &[
    "low",
    "lower",
    "lowest",
    "newer",
    "newest",
    "the",
    "there",
    "thing",
    "and",
    "sand",
    "banana",
    "aaaaa",
    "x",
    "wonderland",
    "我现在在吃",
    "naïve",
];

fn table() -> Arc<MergeTable> {
    let mut builder = MergeTable::builder();
    for (a, b) in MERGES {
        builder.push_str(a, b).unwrap();
    }
    let table = builder.build();
    table.validate().unwrap();
    Arc::new(table)
}

/// Straightforward reference: rebuild the word every round.
fn reference_merge(table: &MergeTable, text: &str) -> Vec<Symbol> {
    let mut word: Vec<Symbol> = text.chars().collect();
    loop {
        let best = word
            .windows(2)
            .filter_map(|w| table.rank((w[0], w[1])).map(|r| ((w[0], w[1]), r)))
            .min_by_key(|&(_, r)| r);
        let Some((pair, _)) = best else {
            return word;
        };
        let replacement = table.replacement(pair).unwrap();
        let mut next = Vec::with_capacity(word.len());
        let mut i = 0;
        while i < word.len() {
            if i + 1 < word.len() && (word[i], word[i + 1]) == pair {
                next.push(replacement);
                i += 2;
            } else {
                next.push(word[i]);
                i += 1;
            }
        }
        word = next;
    }
}

#[test]
fn concrete_low_scenario() {
    let mut builder = MergeTable::builder();
    builder.push_str("l", "o").unwrap();
    builder.push_str("lo", "w").unwrap();
    let mut engine = BpeEngine::new(Arc::new(builder.build()));

    let tokens = engine.tokenize("low").unwrap();
    assert_eq!(tokens, vec!["low"]);
    assert_eq!(engine.untokenize(&tokens), "low");
}

#[test]
fn concrete_empty_table_scenario() {
    let mut engine = BpeEngine::new(Arc::new(MergeTable::new()));
    assert_eq!(engine.tokenize("hi").unwrap(), vec!["h", "i"]);
}

#[test]
fn round_trip_words() {
    let mut engine = BpeEngine::new(table());
    for word in WORDS {
        let tokens = engine.tokenize(word).unwrap();
        assert_eq!(engine.untokenize(&tokens), *word, "tokens {:?}", tokens);
    }
}

#[test]
fn round_trip_with_space_merges() {
    let mut engine = BpeEngine::new(table());

    // " the" is a learned merge, so the space survives inside a token.
    let tokens = engine.tokenize("and the").unwrap();
    assert_eq!(tokens, vec!["and", " the"]);
    assert_eq!(engine.untokenize(&tokens), "and the");

    // An isolated space has no merge and is dropped.
    let tokens = engine.tokenize("and low").unwrap();
    assert_eq!(tokens, vec!["and", "low"]);
    assert_eq!(engine.untokenize(&tokens), "andlow");
}

#[test]
fn merge_halting_is_idempotent() {
    let mut engine = BpeEngine::new(table());
    for word in WORDS {
        let first = engine.tokenize(word).unwrap();
        let again = engine.tokenize(&first.concat()).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn matches_reference_merge() {
    let table = table();
    let mut engine = BpeEngine::new(table.clone());
    for word in WORDS {
        let expected = reference_merge(&table, word);
        assert_eq!(engine.merge(word).unwrap(), expected.as_slice(), "{}", word);
    }
}

#[test]
fn rank_is_never_skipped() {
    let table = table();
    let mut engine = BpeEngine::new(table.clone());
    for word in WORDS {
        let mut applied: Vec<(Pair, u32)> = Vec::new();
        engine
            .merge_cb(word, &mut |pair, rank| applied.push((pair, rank)))
            .unwrap();

        for window in applied.windows(2) {
            assert!(
                window[0].1 <= window[1].1,
                "{}: rank {} applied after {}",
                word,
                window[1].1,
                window[0].1
            );
        }
        for (pair, rank) in &applied {
            assert_eq!(table.rank(*pair), Some(*rank));
        }
    }
}

#[test]
fn global_priority_not_first_occurrence() {
    let mut engine = BpeEngine::new(table());
    // (e, r) at rank 0 beats (n, e) at rank 12 even though (n, e) comes
    // first: n e w e r -> n e w er -> ne w er -> new er.
    assert_eq!(engine.tokenize("newer").unwrap(), vec!["new", "er"]);
}

#[test]
fn non_overlapping_merges() {
    let mut engine = BpeEngine::new(table());
    assert_eq!(engine.tokenize("aaa").unwrap(), vec!["aa", "a"]);
    assert_eq!(engine.tokenize("aaaaa").unwrap(), vec!["aa", "aa", "a"]);
}

#[test]
fn shared_table_across_threads() {
    let table = table();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let table = table.clone();
            std::thread::spawn(move || {
                let mut engine = BpeEngine::new(table);
                WORDS
                    .iter()
                    .map(|w| engine.tokenize(w).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
}
