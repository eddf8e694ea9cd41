//! Encoding modes for BPE tokenization.
//!
//! Only character-level (Unicode scalar value) encoding is provided:
//! every scalar value is one initial symbol.

pub mod char_level;

pub use char_level::BpeEngine;
