//! # Word Structures

use crate::core::merges::{Pair, Symbol};

/// One unit of input at some stage of merging.
///
/// The symbol buffer is cleared, never deallocated, between uses, so its
/// capacity settles at the longest word seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Word {
    symbols: Vec<Symbol>,
}

impl Word {
    /// Create an empty word.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty word with room for `capacity` symbols.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(capacity),
        }
    }

    /// Replace the contents with one symbol per scalar value of `text`.
    pub fn reset(&mut self, text: &str) {
        self.symbols.clear();
        self.symbols.extend(text.chars());
    }

    /// The current symbols.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the word holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Allocated capacity of the symbol buffer.
    pub fn capacity(&self) -> usize {
        self.symbols.capacity()
    }

    /// Adjacent pairs, left to right.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.symbols.windows(2).map(|w| (w[0], w[1]))
    }

    /// Replace every non-overlapping occurrence of `pair` with `replacement`,
    /// scanning left to right.
    ///
    /// `scratch` receives the rewritten sequence and is then swapped in, so
    /// after the call it holds the previous contents. Returns the number of
    /// replacements made.
    pub fn merge_pair(
        &mut self,
        pair: Pair,
        replacement: Symbol,
        scratch: &mut Vec<Symbol>,
    ) -> usize {
        let n = self.symbols.len();
        if n < 2 {
            return 0;
        }

        scratch.clear();
        let mut merged = 0;
        let mut i = 0;
        while i < n {
            let current = self.symbols[i];
            if i + 1 < n && pair == (current, self.symbols[i + 1]) {
                scratch.push(replacement);
                merged += 1;
                // Skip both halves; the merged symbol is never re-examined.
                i += 2;
            } else {
                scratch.push(current);
                i += 1;
            }
        }

        std::mem::swap(&mut self.symbols, scratch);
        merged
    }
}

impl<S: AsRef<str>> From<S> for Word {
    fn from(text: S) -> Self {
        let mut word = Word::new();
        word.reset(text.as_ref());
        word
    }
}
