//! Pipeline composition.
//!
//! A pipeline chains stages from raw text to a token sequence. Every stage
//! declares the [`Shape`] it consumes and the shape it produces:
//!
//! - scalar -> scalar: normalize, lowercase
//! - scalar -> vector: split
//! - vector -> vector: tokenize each piece and flatten
//!
//! Shapes are checked when the pipeline is built. At run time the first
//! failing stage stops the chain; its error is wrapped with the stage's
//! 0-based index and no partial output is returned.

pub mod steps;

pub use steps::{Split, TokenizeStep, Transform, TryTransform};

use runebpe_core::{Result, Shape, TokenizerError, Value};

/// One stage of a pipeline.
pub trait Step {
    /// Short name used in error context.
    fn name(&self) -> &str;

    /// Shape this step consumes.
    fn input(&self) -> Shape;

    /// Shape this step produces.
    fn output(&self) -> Shape;

    /// Run the step on `value`.
    fn run(&mut self, value: Value) -> Result<Value>;
}

impl<S: Step + ?Sized> Step for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn input(&self) -> Shape {
        (**self).input()
    }

    fn output(&self) -> Shape {
        (**self).output()
    }

    fn run(&mut self, value: Value) -> Result<Value> {
        (**self).run(value)
    }
}

/// A boxed pipeline stage.
pub type BoxedStep = Box<dyn Step + Send>;

/// An assembled, shape-checked chain of steps.
pub struct Pipeline {
    steps: Vec<BoxedStep>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    /// Assemble a pipeline, checking that adjacent shapes line up.
    ///
    /// The first step must accept a scalar (the raw input).
    pub fn new(steps: Vec<BoxedStep>) -> Result<Self> {
        if steps.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "pipeline has no steps".to_string(),
            ));
        }

        let mut current = Shape::Scalar;
        for (index, step) in steps.iter().enumerate() {
            if step.input() != current {
                return Err(TokenizerError::ShapeMismatch {
                    expected: step.input(),
                    found: current,
                }
                .at_step(index, step.name()));
            }
            current = step.output();
        }

        log::debug!(
            "assembled pipeline: {}",
            steps.iter().map(|s| s.name()).collect::<Vec<_>>().join(" -> ")
        );
        Ok(Self { steps })
    }

    /// Start building a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps. Always false for a built pipeline.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Shape of the final step's output.
    pub fn output(&self) -> Shape {
        self.steps
            .last()
            .map(|s| s.output())
            .unwrap_or(Shape::Scalar)
    }

    /// Run raw text through every step.
    ///
    /// A vector output with no elements fails the step with
    /// [`TokenizerError::EmptySplit`]. On success a scalar result is returned
    /// as a one-element vector.
    pub fn run(&mut self, text: &str) -> Result<Vec<String>> {
        let mut value = Value::Scalar(text.to_string());

        for (index, step) in self.steps.iter_mut().enumerate() {
            if value.shape() != step.input() {
                return Err(TokenizerError::ShapeMismatch {
                    expected: step.input(),
                    found: value.shape(),
                }
                .at_step(index, step.name()));
            }

            value = step.run(value).map_err(|e| e.at_step(index, step.name()))?;

            if value.shape() != step.output() {
                return Err(TokenizerError::ShapeMismatch {
                    expected: step.output(),
                    found: value.shape(),
                }
                .at_step(index, step.name()));
            }
            if matches!(&value, Value::Vector(v) if v.is_empty()) {
                return Err(TokenizerError::EmptySplit {
                    stage: step.name().to_string(),
                }
                .at_step(index, step.name()));
            }
        }

        Ok(value.into_strings())
    }

    /// Turn the pipeline into a plain function from text to tokens.
    pub fn into_fn(mut self) -> impl FnMut(&str) -> Result<Vec<String>> {
        move |text: &str| self.run(text)
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<BoxedStep>,
}

impl PipelineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn step<S>(mut self, step: S) -> Self
    where
        S: Step + Send + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Append an already boxed step.
    pub fn boxed(mut self, step: BoxedStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Check shapes and build the pipeline.
    pub fn build(self) -> Result<Pipeline> {
        Pipeline::new(self.steps)
    }
}

/// Compose `steps` into a function from raw text to a token sequence.
pub fn compose(steps: Vec<BoxedStep>) -> Result<impl FnMut(&str) -> Result<Vec<String>>> {
    Ok(Pipeline::new(steps)?.into_fn())
}
