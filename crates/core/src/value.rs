//! Values flowing between pipeline stages.
//!
//! A stage either consumes/produces a single string (`Scalar`) or a
//! sequence of strings (`Vector`).

use crate::error::{Result, TokenizerError};
use std::fmt;

/// The declared shape of a stage's input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Vector,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => f.write_str("scalar"),
            Shape::Vector => f.write_str("vector"),
        }
    }
}

/// A pipeline value: one string or a sequence of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    Vector(Vec<String>),
}

impl Value {
    /// The shape of this value.
    #[inline]
    pub fn shape(&self) -> Shape {
        match self {
            Value::Scalar(_) => Shape::Scalar,
            Value::Vector(_) => Shape::Vector,
        }
    }

    /// Borrow the scalar payload.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Vector(_) => None,
        }
    }

    /// Borrow the vector payload.
    pub fn as_vector(&self) -> Option<&[String]> {
        match self {
            Value::Scalar(_) => None,
            Value::Vector(v) => Some(v),
        }
    }

    /// Take the scalar payload, failing with a shape mismatch otherwise.
    pub fn into_scalar(self) -> Result<String> {
        match self {
            Value::Scalar(s) => Ok(s),
            Value::Vector(_) => Err(TokenizerError::ShapeMismatch {
                expected: Shape::Scalar,
                found: Shape::Vector,
            }),
        }
    }

    /// Take the vector payload, failing with a shape mismatch otherwise.
    pub fn into_vector(self) -> Result<Vec<String>> {
        match self {
            Value::Vector(v) => Ok(v),
            Value::Scalar(_) => Err(TokenizerError::ShapeMismatch {
                expected: Shape::Vector,
                found: Shape::Scalar,
            }),
        }
    }

    /// Coerce into a sequence of strings; a scalar becomes a one-element vector.
    pub fn into_strings(self) -> Vec<String> {
        match self {
            Value::Scalar(s) => vec![s],
            Value::Vector(v) => v,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Vector(v)
    }
}
