//! Error types for thickline.

use thiserror::Error;

/// The main error type for thickline operations.
#[derive(Error, Debug)]
pub enum ThicklineError {
    /// A mesh face references a vertex that does not exist.
    #[error("vertex index {index} out of bounds for {len} vertices")]
    InvalidIndex { index: u32, len: usize },

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for thickline operations.
pub type Result<T> = std::result::Result<T, ThicklineError>;
