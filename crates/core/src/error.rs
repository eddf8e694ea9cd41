//! Error types for the runebpe libraries.

use crate::core::merges::Pair;
use crate::value::Shape;
use thiserror::Error;

/// Main error type for tokenization and pipeline composition.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// A merge pair was selected whose replacement symbol is missing.
    #[error("Table inconsistency: no replacement for pair {pair:?}")]
    TableInconsistency { pair: Pair },

    /// A splitting or tokenizing stage produced no output.
    #[error("Empty output from {stage}")]
    EmptySplit { stage: String },

    /// Failure reported by a normalizer.
    #[error("Normalization failed: {0}")]
    Normalization(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A step was handed the wrong value shape.
    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: Shape, found: Shape },

    /// Failure inside a pipeline step, tagged with its 0-based position.
    #[error("in step {index} ({stage}) of pipeline: {source}")]
    Step {
        index: usize,
        stage: String,
        #[source]
        source: Box<TokenizerError>,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid merge rule
    #[error("Invalid merge rule: {0}")]
    InvalidMerge(String),
}

impl TokenizerError {
    /// Build a [`TokenizerError::Normalization`] from any error value.
    pub fn normalization<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Normalization(err.into())
    }

    /// Wrap an error with the position of the pipeline step that raised it.
    pub fn at_step(self, index: usize, stage: impl Into<String>) -> Self {
        Self::Step {
            index,
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// Index of the failing pipeline step, if the error carries one.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Self::Step { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The innermost error, with all step wrappers removed.
    pub fn root(&self) -> &TokenizerError {
        let mut err = self;
        while let Self::Step { source, .. } = err {
            err = source;
        }
        err
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
