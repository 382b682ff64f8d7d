//! Batched encoder adapter.
//!
//! Sits between callers and the raw encoder capability: slices input into
//! fixed-size batches to bound peak memory, normalizes whatever shape the
//! backend produced, and rounds vectors to the stored precision.

use std::sync::Arc;

use tracing::debug;

use crate::error::EmbeddingError;
use crate::model::{Embedding, TextEncoder};

/// Default texts per encode call.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Adapter turning raw encoder output into storage-ready embeddings.
pub struct EncoderAdapter {
    encoder: Arc<dyn TextEncoder>,
    batch_size: usize,
}

impl EncoderAdapter {
    pub fn new(encoder: Arc<dyn TextEncoder>, batch_size: usize) -> Self {
        Self {
            encoder,
            batch_size: batch_size.max(1),
        }
    }

    /// Embed all texts, one fixed-size batch at a time.
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            debug!(count = batch.len(), "Encoding batch");
            let rows = self.encoder.encode(batch)?.into_rows()?;

            if rows.len() != batch.len() {
                return Err(EmbeddingError::InvalidOutput(format!(
                    "encoder returned {} vectors for {} texts",
                    rows.len(),
                    batch.len()
                )));
            }

            vectors.extend(rows.into_iter().map(Embedding::quantized));
        }

        Ok(vectors)
    }

    /// Embed a single text.
    pub fn embed_one(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts)?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidOutput("empty batch result".to_string()))
    }
}
