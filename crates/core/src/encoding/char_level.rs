//! Character-level BPE encoding.
//!
//! Each Unicode scalar value starts out as one symbol. Merges are applied by
//! global rank: every round picks the lowest-ranked pair present anywhere in
//! the word and rewrites all non-overlapping occurrences of it, left to
//! right, until no ranked pair is left.

use crate::core::{MergeTable, Pair, Symbol, Word};
use crate::error::{Result, TokenizerError};
use std::sync::Arc;

/// A lone-space token is a word-boundary artifact and is never emitted.
const SPACE_TOKEN: &str = " ";

/// Rune-level BPE engine.
///
/// Holds private scratch buffers that are reused across calls; their
/// capacity only grows, up to the longest word seen. One engine serves one
/// caller at a time. The [`MergeTable`] is shared read-only, so any number
/// of engines can be built over the same table.
#[derive(Debug, Clone)]
pub struct BpeEngine {
    /// Merge rules shared with other engines
    table: Arc<MergeTable>,
    /// Word being merged
    word: Word,
    /// Rewrite target for each merge round
    scratch: Vec<Symbol>,
    /// Pending symbols during expansion
    stack: Vec<Symbol>,
}

impl BpeEngine {
    /// Initial scratch capacity, in symbols.
    const INITIAL_CAPACITY: usize = 256;

    /// Create an engine over a shared merge table.
    pub fn new(table: Arc<MergeTable>) -> Self {
        Self {
            table,
            word: Word::with_capacity(Self::INITIAL_CAPACITY),
            scratch: Vec::with_capacity(Self::INITIAL_CAPACITY),
            stack: Vec::new(),
        }
    }

    /// The merge table this engine applies.
    pub fn table(&self) -> &Arc<MergeTable> {
        &self.table
    }

    /// Split one word into tokens.
    ///
    /// Each token is the literal text covered by one final symbol. Tokens
    /// that are exactly one space are dropped once merging has run; a word
    /// too short to merge (empty or one symbol) is returned unchanged.
    pub fn tokenize(&mut self, text: &str) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        self.tokenize_into(text, &mut tokens)?;
        Ok(tokens)
    }

    /// Like [`BpeEngine::tokenize`], appending to `out`.
    ///
    /// On error nothing is appended.
    pub fn tokenize_into(&mut self, text: &str, out: &mut Vec<String>) -> Result<()> {
        self.merge(text)?;
        if self.word.len() < 2 {
            out.push(text.to_string());
            return Ok(());
        }

        let Self {
            table, word, stack, ..
        } = self;
        for &symbol in word.symbols() {
            let mut token = String::new();
            table.expand_into(symbol, stack, &mut token);
            if token.is_empty() || token == SPACE_TOKEN {
                continue;
            }
            out.push(token);
        }
        Ok(())
    }

    /// Run the merge loop over `text` and return the final symbols.
    pub fn merge(&mut self, text: &str) -> Result<&[Symbol]> {
        self.merge_cb(text, &mut |_, _| {})
    }

    /// Run the merge loop, invoking `on_merge(pair, rank)` once per round
    /// with the pair that round applied.
    pub fn merge_cb<F>(&mut self, text: &str, on_merge: &mut F) -> Result<&[Symbol]>
    where
        F: FnMut(Pair, u32),
    {
        self.word.reset(text);

        while self.word.len() > 1 {
            let Some((pair, rank)) = self.lowest_ranked_pair() else {
                break;
            };
            let replacement = self
                .table
                .replacement(pair)
                .ok_or(TokenizerError::TableInconsistency { pair })?;

            let merged = self.word.merge_pair(pair, replacement, &mut self.scratch);
            log::trace!(
                "merged {:?} at rank {} ({} occurrences, {} symbols left)",
                pair,
                rank,
                merged,
                self.word.len()
            );
            on_merge(pair, rank);
        }

        Ok(self.word.symbols())
    }

    /// Rebuild text from tokens.
    ///
    /// Every symbol of every token is expanded through the merge table and
    /// the results are concatenated with no separator. Symbols the table does
    /// not know are copied through unchanged.
    pub fn untokenize<S: AsRef<str>>(&mut self, tokens: &[S]) -> String {
        let mut text = String::with_capacity(tokens.iter().map(|t| t.as_ref().len()).sum());
        for token in tokens {
            for symbol in token.as_ref().chars() {
                self.table.expand_into(symbol, &mut self.stack, &mut text);
            }
        }
        text
    }

    /// Combined capacity of the scratch buffers, in symbols.
    pub fn buffer_capacity(&self) -> usize {
        self.word.capacity() + self.scratch.capacity() + self.stack.capacity()
    }

    /// The lowest-ranked pair present anywhere in the current word.
    fn lowest_ranked_pair(&self) -> Option<(Pair, u32)> {
        self.word
            .pairs()
            .filter_map(|pair| self.table.rank(pair).map(|rank| (pair, rank)))
            .min_by_key(|&(_, rank)| rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_table() -> Arc<MergeTable> {
        let mut builder = MergeTable::builder();
        let lo = builder.push('l', 'o').unwrap();
        builder.push(lo, 'w').unwrap();
        Arc::new(builder.build())
    }

    #[test]
    fn test_tokenize_low() {
        let mut engine = BpeEngine::new(low_table());

        assert_eq!(engine.tokenize("low").unwrap(), vec!["low"]);
        assert_eq!(engine.untokenize(&["low"]), "low");
    }

    #[test]
    fn test_tokenize_empty_table() {
        let mut engine = BpeEngine::new(Arc::new(MergeTable::new()));

        assert_eq!(engine.tokenize("hi").unwrap(), vec!["h", "i"]);
    }

    #[test]
    fn test_tokenize_partial_merges() {
        let mut engine = BpeEngine::new(low_table());

        assert_eq!(engine.tokenize("lower").unwrap(), vec!["low", "e", "r"]);
        assert_eq!(engine.tokenize("slot").unwrap(), vec!["s", "lo", "t"]);
        assert_eq!(engine.tokenize("x").unwrap(), vec!["x"]);
    }

    #[test]
    fn test_global_rank_beats_position() {
        // (b, c) outranks (a, b) even though (a, b) occurs first.
        let mut builder = MergeTable::builder();
        builder.push('b', 'c').unwrap();
        builder.push('a', 'b').unwrap();
        let mut engine = BpeEngine::new(Arc::new(builder.build()));

        assert_eq!(engine.tokenize("abc").unwrap(), vec!["a", "bc"]);
    }

    #[test]
    fn test_non_overlapping_round() {
        let mut builder = MergeTable::builder();
        builder.push('a', 'a').unwrap();
        let mut engine = BpeEngine::new(Arc::new(builder.build()));

        assert_eq!(engine.tokenize("aaa").unwrap(), vec!["aa", "a"]);
    }

    #[test]
    fn test_space_tokens_dropped() {
        let mut builder = MergeTable::builder();
        builder.push('a', 'b').unwrap();
        let mut engine = BpeEngine::new(Arc::new(builder.build()));

        assert_eq!(engine.tokenize("ab ab").unwrap(), vec!["ab", "ab"]);
        assert!(engine.tokenize("  ").unwrap().is_empty());
    }

    #[test]
    fn test_short_words_returned_unchanged() {
        // Nothing to merge, so the space filter never runs.
        let mut engine = BpeEngine::new(Arc::new(MergeTable::new()));

        assert_eq!(engine.tokenize(" ").unwrap(), vec![" "]);
        assert_eq!(engine.tokenize("").unwrap(), vec![""]);
        assert_eq!(engine.tokenize("é").unwrap(), vec!["é"]);
        assert_eq!(engine.untokenize(&[" "]), " ");
    }

    #[test]
    fn test_missing_replacement_is_reported() {
        let table = MergeTable::from_parts([('a', 'b')], Vec::<(Pair, Symbol)>::new());
        let mut engine = BpeEngine::new(Arc::new(table));

        let err = engine.tokenize("xab").unwrap_err();
        assert!(matches!(
            err,
            TokenizerError::TableInconsistency { pair: ('a', 'b') }
        ));
    }

    #[test]
    fn test_tokenize_into_leaves_output_on_error() {
        let table = MergeTable::from_parts([('a', 'b')], Vec::<(Pair, Symbol)>::new());
        let mut engine = BpeEngine::new(Arc::new(table));
        let mut out = vec!["keep".to_string()];

        assert!(engine.tokenize_into("ab", &mut out).is_err());
        assert_eq!(out, vec!["keep"]);
    }

    #[test]
    fn test_merge_cb_reports_rounds() {
        let mut engine = BpeEngine::new(low_table());
        let mut ranks = Vec::new();

        let symbols = engine
            .merge_cb("lowlo", &mut |_, rank| ranks.push(rank))
            .unwrap()
            .len();

        assert_eq!(ranks, vec![0, 1]);
        assert_eq!(symbols, 2);
    }

    #[test]
    fn test_untokenize_passes_unknown_symbols() {
        let mut engine = BpeEngine::new(low_table());
        assert_eq!(engine.untokenize(&["lo", "w", "\u{10FFFD}"]), "low\u{10FFFD}");
    }

    #[test]
    fn test_buffers_stabilize() {
        let mut engine = BpeEngine::new(low_table());
        let long = "lowlowlow".repeat(100);

        engine.tokenize(&long).unwrap();
        let capacity = engine.buffer_capacity();
        for _ in 0..10 {
            engine.tokenize(&long).unwrap();
            engine.tokenize("low").unwrap();
        }
        assert_eq!(engine.buffer_capacity(), capacity);
    }
}
