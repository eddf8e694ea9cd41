//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that wires a merge
//! table into a normalize -> split -> tokenize pipeline.

use crate::pipeline::{Pipeline, TokenizeStep, Transform};
use crate::pre_tokenizer::{NormalizationForm, Normalizer, SplitPattern, Splitter};
use runebpe_core::{BpeEngine, MergeTable, Result, TokenizerError};
use std::sync::Arc;

/// Configuration for building a tokenizer.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Unicode normalization form
    pub normalization: NormalizationForm,
    /// Remove combining marks during normalization
    pub strip_marks: bool,
    /// Lowercase after normalization
    pub lowercase: bool,
    /// How to split normalized text into words
    pub split: SplitPattern,
    /// Capacity of the per-pipeline word cache (0 disables it)
    pub cache_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationForm::NFC,
            strip_marks: false,
            lowercase: false,
            split: SplitPattern::Whitespace,
            cache_capacity: 1000,
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
    table: Option<Arc<MergeTable>>,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merge table. Without one nothing merges.
    pub fn merge_table(mut self, table: impl Into<Arc<MergeTable>>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the normalization form.
    pub fn normalization(mut self, form: NormalizationForm) -> Self {
        self.config.normalization = form;
        self
    }

    /// Strip combining marks (accents) during normalization.
    pub fn strip_marks(mut self, strip: bool) -> Self {
        self.config.strip_marks = strip;
        self
    }

    /// Lowercase text before splitting.
    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.config.lowercase = lowercase;
        self
    }

    /// Set the split pattern.
    pub fn split(mut self, pattern: SplitPattern) -> Self {
        self.config.split = pattern;
        self
    }

    /// Set the word cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: TokenizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        let table = self.table.unwrap_or_default();
        Tokenizer::new(table, self.config)
    }
}

/// Main tokenizer struct.
///
/// Owns one pipeline (and so one engine with its scratch buffers); use one
/// tokenizer per thread, or [`Tokenizer::encode_batch`] which builds a
/// pipeline per worker over the same shared table.
pub struct Tokenizer {
    /// Shared merge table
    table: Arc<MergeTable>,
    /// Configuration
    config: TokenizerConfig,
    /// normalize -> split -> tokenize
    pipeline: Pipeline,
    /// Engine used for decoding
    decoder: BpeEngine,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("merges", &self.table.len())
            .field("config", &self.config)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl Tokenizer {
    /// Create a new tokenizer over `table` with the given configuration.
    pub fn new(table: Arc<MergeTable>, config: TokenizerConfig) -> Result<Self> {
        let pipeline = Self::build_pipeline(&table, &config)?;
        log::debug!(
            "built tokenizer: {} merges, pipeline {:?}",
            table.len(),
            pipeline
        );

        Ok(Self {
            decoder: BpeEngine::new(table.clone()),
            table,
            config,
            pipeline,
        })
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    fn build_pipeline(table: &Arc<MergeTable>, config: &TokenizerConfig) -> Result<Pipeline> {
        let normalizer =
            Normalizer::new(config.normalization).with_strip_marks(config.strip_marks);

        let mut builder = Pipeline::builder();
        if normalizer.is_enabled() {
            builder = builder.step(normalizer);
        }
        if config.lowercase {
            builder = builder.step(Transform::lowercase());
        }
        builder
            .step(Splitter::new(config.split.clone()))
            .step(TokenizeStep::with_cache(
                BpeEngine::new(table.clone()),
                config.cache_capacity,
            ))
            .build()
    }

    /// Split text into tokens.
    pub fn tokenize(&mut self, text: &str) -> Result<Vec<String>> {
        self.pipeline.run(text)
    }

    /// Encode text, keeping the input alongside the tokens.
    pub fn encode(&mut self, text: &str) -> Result<Encoding> {
        let tokens = self.tokenize(text)?;
        Ok(Encoding {
            tokens,
            text: text.to_string(),
        })
    }

    /// Encode a batch of texts (parallelized).
    ///
    /// Each worker thread builds its own pipeline; the merge table is shared.
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Encoding>> {
        use rayon::prelude::*;

        let table = &self.table;
        let config = &self.config;
        texts
            .par_iter()
            .map_init(
                || Self::build_pipeline(table, config),
                |pipeline, text| match pipeline {
                    Ok(pipeline) => pipeline.run(text).map(|tokens| Encoding {
                        tokens,
                        text: text.clone(),
                    }),
                    Err(e) => Err(TokenizerError::InvalidConfig(e.to_string())),
                },
            )
            .collect()
    }

    /// Rebuild text from tokens.
    pub fn decode<S: AsRef<str>>(&mut self, tokens: &[S]) -> String {
        self.decoder.untokenize(tokens)
    }

    /// Get a reference to the merge table.
    pub fn merge_table(&self) -> &Arc<MergeTable> {
        &self.table
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }
}

/// Result of encoding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Tokens
    pub tokens: Vec<String>,
    /// Original text
    pub text: String,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
