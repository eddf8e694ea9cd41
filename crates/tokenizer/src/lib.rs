//! Runebpe-tokenizer - High-level tokenizer API
//!
//! This crate wraps the merge engine from `runebpe-core` in a composable
//! text pipeline: normalization, lowercasing, splitting, and per-word BPE.
//!
//! # Features
//!
//! - Shape-checked pipelines of scalar/vector steps with step-indexed errors
//! - Unicode normalization (NFC, NFD, NFKC, NFKD) with optional accent stripping
//! - Whitespace, single-space, word-boundary, character and regex splitting
//! - LRU word cache and parallel batch encoding
//!
//! # Example
//!
//! ```rust
//! use runebpe_tokenizer::{MergeTable, Tokenizer};
//!
//! let mut merges = MergeTable::builder();
//! merges.push_str("l", "o")?;
//! merges.push_str("lo", "w")?;
//!
//! let mut tokenizer = Tokenizer::builder()
//!     .merge_table(merges.build())
//!     .lowercase(true)
//!     .build()?;
//!
//! let tokens = tokenizer.tokenize("Low lower")?;
//! assert_eq!(tokens, vec!["low", "low", "e", "r"]);
//! assert_eq!(tokenizer.decode(&tokens), "lowlower");
//! # Ok::<(), runebpe_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use runebpe_core::{
    BpeEngine, MergeTable, MergeTableBuilder, Pair, Result, Shape, Symbol, TokenizerError, Value,
};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Encoding, Tokenizer, TokenizerBuilder, TokenizerConfig};

// Pipeline composition
pub mod pipeline;
pub use pipeline::{compose, BoxedStep, Pipeline, PipelineBuilder, Step};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{NormalizationForm, Normalizer, SplitPattern, Splitter};

// Utilities
pub mod utils;
pub use utils::EncodingCache;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
