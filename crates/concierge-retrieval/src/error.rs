//! Retrieval error types.

use thiserror::Error;

/// Errors from retrieval and answer extraction.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The answer model failed
    #[error("Answer model error: {0}")]
    Answer(String),
}
