//! Ready-made pipeline steps.

use super::Step;
use crate::pre_tokenizer::{Normalizer, Splitter};
use crate::utils::EncodingCache;
use runebpe_core::{BpeEngine, Result, Shape, TokenizerError, Value};

/// scalar -> scalar step from an infallible function.
pub struct Transform<F> {
    name: &'static str,
    f: F,
}

impl<F> Transform<F>
where
    F: Fn(&str) -> String,
{
    pub fn new(f: F) -> Self {
        Self {
            name: "transform",
            f,
        }
    }

    /// Rename the step for error context.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl Transform<fn(&str) -> String> {
    /// Unicode-aware lowercasing.
    pub fn lowercase() -> Self {
        Transform::new(str::to_lowercase as fn(&str) -> String).named("lowercase")
    }
}

impl<F> Step for Transform<F>
where
    F: Fn(&str) -> String,
{
    fn name(&self) -> &str {
        self.name
    }

    fn input(&self) -> Shape {
        Shape::Scalar
    }

    fn output(&self) -> Shape {
        Shape::Scalar
    }

    fn run(&mut self, value: Value) -> Result<Value> {
        let text = value.into_scalar()?;
        Ok(Value::Scalar((self.f)(&text)))
    }
}

/// scalar -> scalar step from a fallible function.
///
/// Errors from the function are reported as normalization failures, with
/// the original error kept as the source.
pub struct TryTransform<F> {
    name: &'static str,
    f: F,
}

impl<F, E> TryTransform<F>
where
    F: Fn(&str) -> std::result::Result<String, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    pub fn new(f: F) -> Self {
        Self {
            name: "normalize",
            f,
        }
    }

    /// Rename the step for error context.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl<F, E> Step for TryTransform<F>
where
    F: Fn(&str) -> std::result::Result<String, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn input(&self) -> Shape {
        Shape::Scalar
    }

    fn output(&self) -> Shape {
        Shape::Scalar
    }

    fn run(&mut self, value: Value) -> Result<Value> {
        let text = value.into_scalar()?;
        (self.f)(&text)
            .map(Value::Scalar)
            .map_err(TokenizerError::normalization)
    }
}

/// scalar -> vector step from a splitting function.
pub struct Split<F> {
    f: F,
}

impl<F> Split<F>
where
    F: Fn(&str) -> Vec<String>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Step for Split<F>
where
    F: Fn(&str) -> Vec<String>,
{
    fn name(&self) -> &str {
        "split"
    }

    fn input(&self) -> Shape {
        Shape::Scalar
    }

    fn output(&self) -> Shape {
        Shape::Vector
    }

    fn run(&mut self, value: Value) -> Result<Value> {
        let text = value.into_scalar()?;
        Ok(Value::Vector((self.f)(&text)))
    }
}

impl Step for Normalizer {
    fn name(&self) -> &str {
        "normalize"
    }

    fn input(&self) -> Shape {
        Shape::Scalar
    }

    fn output(&self) -> Shape {
        Shape::Scalar
    }

    fn run(&mut self, value: Value) -> Result<Value> {
        let text = value.into_scalar()?;
        Ok(Value::Scalar(self.normalize(&text)))
    }
}

impl Step for Splitter {
    fn name(&self) -> &str {
        "split"
    }

    fn input(&self) -> Shape {
        Shape::Scalar
    }

    fn output(&self) -> Shape {
        Shape::Vector
    }

    fn run(&mut self, value: Value) -> Result<Value> {
        let text = value.into_scalar()?;
        Ok(Value::Vector(self.split(&text)))
    }
}

/// vector -> vector step: tokenize every piece and flatten the tokens.
///
/// Optionally remembers the tokens of recently seen pieces.
#[derive(Debug, Clone)]
pub struct TokenizeStep {
    engine: BpeEngine,
    cache: EncodingCache,
}

impl TokenizeStep {
    /// Tokenize without caching.
    pub fn new(engine: BpeEngine) -> Self {
        Self::with_cache(engine, 0)
    }

    /// Tokenize, caching up to `capacity` pieces (0 disables the cache).
    pub fn with_cache(engine: BpeEngine, capacity: usize) -> Self {
        Self {
            engine,
            cache: EncodingCache::with_capacity(capacity),
        }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &BpeEngine {
        &self.engine
    }

    /// The piece cache.
    pub fn cache(&self) -> &EncodingCache {
        &self.cache
    }

    /// Tokenize every piece, all or nothing.
    pub fn tokenize_all(&mut self, pieces: &[String]) -> Result<Vec<String>> {
        let mut tokens = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let engine = &mut self.engine;
            let piece_tokens = self
                .cache
                .get_or_encode(piece, |text| engine.tokenize(text))?;
            tokens.extend(piece_tokens);
        }
        Ok(tokens)
    }
}

impl Step for TokenizeStep {
    fn name(&self) -> &str {
        "tokenize"
    }

    fn input(&self) -> Shape {
        Shape::Vector
    }

    fn output(&self) -> Shape {
        Shape::Vector
    }

    fn run(&mut self, value: Value) -> Result<Value> {
        let pieces = value.into_vector()?;
        Ok(Value::Vector(self.tokenize_all(&pieces)?))
    }
}

impl Step for BpeEngine {
    fn name(&self) -> &str {
        "tokenize"
    }

    fn input(&self) -> Shape {
        Shape::Vector
    }

    fn output(&self) -> Shape {
        Shape::Vector
    }

    fn run(&mut self, value: Value) -> Result<Value> {
        let pieces = value.into_vector()?;
        let mut tokens = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            self.tokenize_into(piece, &mut tokens)?;
        }
        Ok(Value::Vector(tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runebpe_core::MergeTable;
    use std::sync::Arc;

    fn engine() -> BpeEngine {
        let mut builder = MergeTable::builder();
        let lo = builder.push('l', 'o').unwrap();
        builder.push(lo, 'w').unwrap();
        BpeEngine::new(Arc::new(builder.build()))
    }

    fn pieces(s: &[&str]) -> Value {
        Value::Vector(s.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_transform() {
        let mut step = Transform::new(|s: &str| s.replace('-', " "));
        assert_eq!(step.run(Value::from("a-b")).unwrap(), Value::from("a b"));
        assert_eq!(step.name(), "transform");
        assert_eq!(Transform::lowercase().name(), "lowercase");
    }

    #[test]
    fn test_transform_rejects_vector() {
        let mut step = Transform::lowercase();
        let err = step.run(pieces(&["A"])).unwrap_err();
        assert!(matches!(err, TokenizerError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_try_transform_failure() {
        let mut step = TryTransform::new(|s: &str| {
            if s.contains('\0') {
                Err("NUL in input")
            } else {
                Ok(s.to_string())
            }
        });

        assert_eq!(step.run(Value::from("ok")).unwrap(), Value::from("ok"));
        let err = step.run(Value::from("a\0b")).unwrap_err();
        assert_eq!(err.to_string(), "Normalization failed: NUL in input");
    }

    #[test]
    fn test_normalizer_step() {
        let mut step = Normalizer::strip_accents();
        assert_eq!(step.run(Value::from("café")).unwrap(), Value::from("cafe"));
    }

    #[test]
    fn test_splitter_step() {
        let mut step = Splitter::whitespace();
        assert_eq!(step.run(Value::from("a b")).unwrap(), pieces(&["a", "b"]));
    }

    #[test]
    fn test_tokenize_step_flattens() {
        let mut step = TokenizeStep::new(engine());
        let out = step.run(pieces(&["low", "lot"])).unwrap();
        assert_eq!(out, pieces(&["low", "lo", "t"]));
    }

    #[test]
    fn test_tokenize_step_cache() {
        let mut step = TokenizeStep::with_cache(engine(), 16);
        step.run(pieces(&["low", "low", "lot"])).unwrap();

        assert_eq!(step.cache().len(), 2);
        assert!(step.cache().contains("low"));
    }

    #[test]
    fn test_engine_as_step() {
        let mut step = engine();
        let out = step.run(pieces(&["slow", "lo"])).unwrap();
        assert_eq!(out, pieces(&["s", "low", "lo"]));
    }
}
