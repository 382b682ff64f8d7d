//! Error types shared across the concierge engine.

use thiserror::Error;

/// Unified error type for concierge operations.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catalog data could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
