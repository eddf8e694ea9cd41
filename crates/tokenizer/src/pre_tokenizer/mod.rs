//! Pre-tokenization stages.
//!
//! This module provides the operations applied before BPE encoding:
//! Unicode normalization and splitting text into words.

pub mod normalize;
pub mod split;

pub use normalize::{NormalizationForm, Normalizer};
pub use split::{SplitPattern, Splitter};
