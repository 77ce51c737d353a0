//! Error types for rendergate-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid trace pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl Error {
    /// Build a type error from the expected type and the value actually found
    pub(crate) fn type_error(expected: &str, got: &crate::Value) -> Self {
        Error::TypeError {
            expected: expected.to_string(),
            got: got.type_name().to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
