//! Runebpe-core - Core BPE algorithm implementation
//!
//! This crate applies a previously learned merge table to split words into
//! subword tokens, and reverses that split.
//!
//! # Features
//!
//! - Merge tables keyed by ordered symbol pairs, with synthetic symbols for
//!   merged pairs and a reverse map for untokenization
//! - A reusable engine that merges by global rank with bounded scratch memory
//! - The scalar/vector value type shared by pipeline stages
//! - Error handling with step-level context
//!
//! # Example
//!
//! ```rust
//! use runebpe_core::{BpeEngine, MergeTable};
//! use std::sync::Arc;
//!
//! let mut builder = MergeTable::builder();
//! let lo = builder.push('l', 'o')?;
//! builder.push(lo, 'w')?;
//!
//! let mut engine = BpeEngine::new(Arc::new(builder.build()));
//! let tokens = engine.tokenize("lower")?;
//! assert_eq!(tokens, vec!["low", "e", "r"]);
//! assert_eq!(engine.untokenize(&tokens), "lower");
//! # Ok::<(), runebpe_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE data structures
pub mod core;
pub use core::{MergeStats, MergeTable, MergeTableBuilder, Pair, Symbol, Word};

// Encoding modes
pub mod encoding;
pub use encoding::BpeEngine;

// Pipeline values
pub mod value;
pub use value::{Shape, Value};
