//! Merge table storage for rune-level BPE.
//!
//! A merge table is built from an ordered list of learned pairs (position in
//! the list is the rank, lower = applied first) and a replacement map from
//! each pair to the synthetic symbol standing for the merged pair. The
//! reverse map is derived from the replacement map and drives untokenization.

use crate::error::{Result, TokenizerError};
use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;

/// An indivisible unit of text: a Unicode scalar value, or a synthetic
/// symbol allocated for a merged pair.
pub type Symbol = char;

/// An ordered pair of symbols. `(a, b)` and `(b, a)` are distinct keys.
pub type Pair = (Symbol, Symbol);

/// Pair -> rank.
pub type RankMap = AHashMap<Pair, u32>;

/// Pair -> synthetic replacement symbol.
pub type ReplacementMap = AHashMap<Pair, Symbol>;

/// Synthetic symbol -> the pair it replaces.
pub type ReverseMap = AHashMap<Symbol, Pair>;

/// First code point handed out for synthetic symbols (start of
/// Supplementary Private Use Area-A).
pub const SYNTHETIC_START: u32 = 0xF_0000;

/// Last code point handed out for synthetic symbols (end of
/// Supplementary Private Use Area-B).
pub const SYNTHETIC_END: u32 = 0x10_FFFD;

/// Immutable, pre-learned merge table.
///
/// Read-only after construction; share it between engines behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    ranks: RankMap,
    replacements: ReplacementMap,
    reverse: ReverseMap,
}

impl MergeTable {
    /// Create an empty table. Nothing merges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an encoder's ordered pair list and replacement map.
    ///
    /// The position of a pair in `pairs` is its rank. When a pair is listed
    /// twice the first position wins. No validation happens here; see
    /// [`MergeTable::validate`].
    pub fn from_parts<P, R>(pairs: P, replacements: R) -> Self
    where
        P: IntoIterator<Item = Pair>,
        R: IntoIterator<Item = (Pair, Symbol)>,
    {
        let mut ranks = RankMap::new();
        for (rank, pair) in pairs.into_iter().enumerate() {
            ranks.entry(pair).or_insert(rank as u32);
        }

        let replacements: ReplacementMap = replacements.into_iter().collect();
        let reverse = replacements.iter().map(|(&pair, &sym)| (sym, pair)).collect();

        Self {
            ranks,
            replacements,
            reverse,
        }
    }

    /// Start building a table, allocating synthetic symbols as pairs are added.
    pub fn builder() -> MergeTableBuilder {
        MergeTableBuilder::new()
    }

    /// Rank of a pair, `None` if it never merges.
    #[inline]
    pub fn rank(&self, pair: Pair) -> Option<u32> {
        self.ranks.get(&pair).copied()
    }

    /// Synthetic symbol replacing a pair.
    #[inline]
    pub fn replacement(&self, pair: Pair) -> Option<Symbol> {
        self.replacements.get(&pair).copied()
    }

    /// The pair a synthetic symbol replaces, `None` for literal symbols.
    #[inline]
    pub fn decompose(&self, symbol: Symbol) -> Option<Pair> {
        self.reverse.get(&symbol).copied()
    }

    /// Whether `symbol` is the result of a merge.
    #[inline]
    pub fn is_merged(&self, symbol: Symbol) -> bool {
        self.reverse.contains_key(&symbol)
    }

    /// Append the literal expansion of `symbol` to `out`.
    ///
    /// Merged symbols are expanded depth-first, first constituent before
    /// second, using `stack` as the pending-work list instead of recursion.
    /// `stack` is cleared on entry; its capacity is kept.
    pub fn expand_into(&self, symbol: Symbol, stack: &mut Vec<Symbol>, out: &mut String) {
        stack.clear();
        stack.push(symbol);
        while let Some(sym) = stack.pop() {
            match self.decompose(sym) {
                Some((first, second)) => {
                    stack.push(second);
                    stack.push(first);
                }
                None => out.push(sym),
            }
        }
    }

    /// The literal expansion of `symbol`.
    pub fn expand(&self, symbol: Symbol) -> String {
        let mut out = String::new();
        self.expand_into(symbol, &mut Vec::new(), &mut out);
        out
    }

    /// Number of ranked pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether the table has no ranked pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Ranked pairs in rank order.
    pub fn pairs(&self) -> Vec<(Pair, u32)> {
        let mut pairs: Vec<(Pair, u32)> = self.ranks.iter().map(|(&p, &r)| (p, r)).collect();
        pairs.sort_by_key(|&(_, rank)| rank);
        pairs
    }

    /// Eagerly check the table invariants.
    ///
    /// - rank and replacement maps cover the same pairs
    /// - every replacement symbol maps back to exactly one pair
    /// - no symbol decomposes (directly or transitively) into itself
    ///
    /// The engine does not require this; it reports a missing replacement
    /// lazily when the pair is selected.
    pub fn validate(&self) -> Result<()> {
        for pair in self.ranks.keys() {
            if !self.replacements.contains_key(pair) {
                return Err(TokenizerError::InvalidMerge(format!(
                    "ranked pair {:?} has no replacement",
                    pair
                )));
            }
        }
        for pair in self.replacements.keys() {
            if !self.ranks.contains_key(pair) {
                return Err(TokenizerError::InvalidMerge(format!(
                    "replacement for {:?} has no rank",
                    pair
                )));
            }
        }
        for (pair, sym) in &self.replacements {
            if self.reverse.get(sym) != Some(pair) {
                return Err(TokenizerError::InvalidMerge(format!(
                    "symbol {:?} replaces more than one pair",
                    sym
                )));
            }
        }
        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Open,
            Done,
        }

        let mut marks: AHashMap<Symbol, Mark> = AHashMap::with_capacity(self.reverse.len());
        let mut stack: Vec<(Symbol, bool)> = Vec::new();

        for &root in self.reverse.keys() {
            if marks.contains_key(&root) {
                continue;
            }
            stack.push((root, false));
            while let Some((sym, children_done)) = stack.pop() {
                if children_done {
                    marks.insert(sym, Mark::Done);
                    continue;
                }
                match marks.get(&sym) {
                    Some(Mark::Done) => continue,
                    Some(Mark::Open) => {
                        return Err(TokenizerError::InvalidMerge(format!(
                            "symbol {:?} decomposes into itself",
                            sym
                        )))
                    }
                    None => {}
                }
                marks.insert(sym, Mark::Open);
                stack.push((sym, true));
                if let Some((first, second)) = self.decompose(sym) {
                    for child in [second, first] {
                        if !self.is_merged(child) {
                            continue;
                        }
                        match marks.get(&child) {
                            Some(Mark::Done) => {}
                            Some(Mark::Open) => {
                                return Err(TokenizerError::InvalidMerge(format!(
                                    "symbol {:?} decomposes into itself",
                                    child
                                )))
                            }
                            None => stack.push((child, false)),
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Get statistics about the table.
    pub fn stats(&self) -> MergeStats {
        let mut min_rank = u32::MAX;
        let mut max_rank = 0;

        for &rank in self.ranks.values() {
            min_rank = min_rank.min(rank);
            max_rank = max_rank.max(rank);
        }

        MergeStats {
            count: self.len(),
            synthetic: self.reverse.len(),
            max_rank,
            min_rank: if min_rank == u32::MAX { 0 } else { min_rank },
        }
    }
}

/// Statistics about a merge table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of ranked pairs
    pub count: usize,
    /// Number of synthetic symbols
    pub synthetic: usize,
    /// Maximum rank
    pub max_rank: u32,
    /// Minimum rank
    pub min_rank: u32,
}

/// Incremental construction of a [`MergeTable`].
///
/// Pairs are ranked in the order they are pushed. Each new pair gets the
/// next free code point from the private-use planes, skipping any code point
/// already used as a literal symbol in an earlier pair.
#[derive(Debug, Clone)]
pub struct MergeTableBuilder {
    pairs: Vec<Pair>,
    replacements: ReplacementMap,
    literals: AHashSet<Symbol>,
    /// Expansion text -> synthetic symbol, for resolving textual components.
    spelled: AHashMap<CompactString, Symbol>,
    spellings: AHashMap<Symbol, CompactString>,
    next: u32,
}

impl MergeTableBuilder {
    pub fn new() -> Self {
        Self {
            pairs: Vec::new(),
            replacements: ReplacementMap::new(),
            literals: AHashSet::new(),
            spelled: AHashMap::new(),
            spellings: AHashMap::new(),
            next: SYNTHETIC_START,
        }
    }

    /// Add a merge of `first` then `second`, returning its replacement symbol.
    ///
    /// Pushing a pair that is already present returns the existing symbol and
    /// keeps the earlier rank.
    pub fn push(&mut self, first: Symbol, second: Symbol) -> Result<Symbol> {
        let pair = (first, second);
        if let Some(&sym) = self.replacements.get(&pair) {
            return Ok(sym);
        }

        for sym in [first, second] {
            if !self.spellings.contains_key(&sym) {
                self.literals.insert(sym);
            }
        }

        let replacement = self.allocate()?;
        let mut spelling = self.spelling(first);
        spelling.push_str(&self.spelling(second));

        self.pairs.push(pair);
        self.replacements.insert(pair, replacement);
        self.spelled.entry(spelling.clone()).or_insert(replacement);
        self.spellings.insert(replacement, spelling);
        Ok(replacement)
    }

    /// Add a merge given as text, e.g. `("lo", "w")`.
    ///
    /// A single-character component is taken literally. A longer component
    /// must be the spelling of a symbol produced by an earlier push.
    pub fn push_str(&mut self, first: &str, second: &str) -> Result<Symbol> {
        let first = self.resolve(first)?;
        let second = self.resolve(second)?;
        self.push(first, second)
    }

    /// Finish building.
    pub fn build(self) -> MergeTable {
        MergeTable::from_parts(self.pairs, self.replacements)
    }

    fn resolve(&self, text: &str) -> Result<Symbol> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(TokenizerError::InvalidMerge(
                "empty merge component".to_string(),
            )),
            (Some(c), None) => Ok(c),
            _ => self.spelled.get(text).copied().ok_or_else(|| {
                TokenizerError::InvalidMerge(format!(
                    "component {:?} is not produced by any earlier merge",
                    text
                ))
            }),
        }
    }

    fn spelling(&self, symbol: Symbol) -> CompactString {
        match self.spellings.get(&symbol) {
            Some(text) => text.clone(),
            None => {
                let mut text = CompactString::default();
                text.push(symbol);
                text
            }
        }
    }

    fn allocate(&mut self) -> Result<Symbol> {
        while self.next <= SYNTHETIC_END {
            let cp = self.next;
            self.next += 1;
            // Skip the U+xFFFE / U+xFFFF noncharacters.
            if cp & 0xFFFE == 0xFFFE {
                continue;
            }
            if let Some(sym) = char::from_u32(cp) {
                if !self.literals.contains(&sym) {
                    return Ok(sym);
                }
            }
        }
        Err(TokenizerError::InvalidMerge(
            "synthetic symbol space exhausted".to_string(),
        ))
    }
}

impl Default for MergeTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
