//! Text splitting for pre-tokenization.
//!
//! This module provides various text splitting strategies used before
//! BPE encoding, such as whitespace splitting and regex-based splitting.

use regex::Regex;
use runebpe_core::{Result, TokenizerError};
use unicode_segmentation::UnicodeSegmentation;

/// Splitting patterns.
#[derive(Debug, Clone)]
pub enum SplitPattern {
    /// No splitting (keep text as-is)
    NoSplit,
    /// Split on runs of Unicode whitespace
    Whitespace,
    /// Split on every single space; empty pieces are kept
    Space,
    /// Split on any character (character-level)
    Character,
    /// Unicode word boundaries (UAX #29), whitespace pieces dropped
    Words,
    /// Custom regex pattern matching the separators
    Regex(Regex),
}

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone)]
pub struct Splitter {
    /// Pattern to split on
    pattern: SplitPattern,
}

impl Splitter {
    /// Create a new splitter.
    pub fn new(pattern: SplitPattern) -> Self {
        Self { pattern }
    }

    /// Create a whitespace splitter.
    pub fn whitespace() -> Self {
        Self::new(SplitPattern::Whitespace)
    }

    /// Create a single-space splitter.
    pub fn space() -> Self {
        Self::new(SplitPattern::Space)
    }

    /// Create a character-level splitter.
    pub fn character() -> Self {
        Self::new(SplitPattern::Character)
    }

    /// Create a splitter on separators matched by `pattern`.
    pub fn regex(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| {
            TokenizerError::InvalidConfig(format!("invalid split pattern {:?}: {}", pattern, e))
        })?;
        Ok(Self::new(SplitPattern::Regex(re)))
    }

    /// The configured pattern.
    pub fn pattern(&self) -> &SplitPattern {
        &self.pattern
    }

    /// Split text into chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        match &self.pattern {
            SplitPattern::NoSplit => vec![text.to_string()],
            SplitPattern::Whitespace => text.split_whitespace().map(|s| s.to_string()).collect(),
            SplitPattern::Space => text.split(' ').map(|s| s.to_string()).collect(),
            SplitPattern::Character => text.chars().map(|c| c.to_string()).collect(),
            SplitPattern::Words => text
                .split_word_bounds()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.to_string())
                .collect(),
            SplitPattern::Regex(re) => re.split(text).map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(SplitPattern::NoSplit)
    }
}
