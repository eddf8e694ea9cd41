//! Core BPE data structures.
//!
//! This module contains the merge table and the word buffer the engine
//! rewrites, independent of any specific encoding mode.

pub mod merges;
pub mod word;

pub use merges::{MergeStats, MergeTable, MergeTableBuilder, Pair, Symbol};
pub use word::Word;
