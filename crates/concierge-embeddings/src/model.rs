//! Embedding vector type and the encoder capability contract.

use std::sync::Arc;

use crate::error::EmbeddingError;
use crate::output::EncoderOutput;
use crate::status::StatusSink;

/// Decimal places kept when a vector is prepared for storage.
///
/// Rounding keeps cache payloads small and makes repeat comparisons stable
/// across sessions.
pub const STORED_PRECISION: u32 = 6;

fn round_to_precision(value: f32) -> f32 {
    let scale = 10f32.powi(STORED_PRECISION as i32);
    (value * scale).round() / scale
}

/// Vector embedding over a fixed-dimension semantic space.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding rounded to the stored precision.
    pub fn quantized(values: Vec<f32>) -> Self {
        Self {
            values: values.into_iter().map(round_to_precision).collect(),
        }
    }

    /// Wrap pre-rounded values (cache reads).
    pub fn from_values(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Compute cosine similarity with another embedding.
    ///
    /// Iterates over the shorter of the two lengths, so dimension drift
    /// degrades the score instead of failing. Either vector having zero
    /// magnitude scores exactly 0: an empty or failed embedding means
    /// "no relevance", not an error.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        let len = self.values.len().min(other.values.len());

        let mut dot = 0.0f32;
        let mut mag_a = 0.0f32;
        let mut mag_b = 0.0f32;

        for index in 0..len {
            let a = self.values[index];
            let b = other.values[index];
            dot += a * b;
            mag_a += a * a;
            mag_b += b * b;
        }

        if mag_a == 0.0 || mag_b == 0.0 {
            return 0.0;
        }

        dot / (mag_a.sqrt() * mag_b.sqrt())
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub name: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length in tokens
    pub max_sequence_length: usize,
}

/// The text encoder capability.
///
/// Implementations own pooling and normalization; callers only see one
/// batch of strings in and one (possibly oddly shaped) batch of vectors
/// out. Implementations must be thread-safe.
pub trait TextEncoder: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Encode a batch of texts into vectors.
    fn encode(&self, texts: &[String]) -> Result<EncoderOutput, EmbeddingError>;
}

/// Lazily yields a ready encoder, loading it on first use.
///
/// The production provider is registry-backed; tests substitute a stub.
pub trait EncoderProvider: Send + Sync {
    /// Model repository id the provider serves.
    fn model_id(&self) -> &str;

    /// Get a ready encoder, loading the model if needed.
    fn encoder(&self, sink: &dyn StatusSink) -> Result<Arc<dyn TextEncoder>, EmbeddingError>;
}
