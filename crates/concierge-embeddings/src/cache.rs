//! Persistent embedding cache.
//!
//! Vectors are cached per event under (model id, corpus version, ordered
//! item-id list). Validity is an exact, position-for-position match on all
//! three; any drift (new version, different model, one changed or
//! reordered id) voids the whole set and triggers a full recompute.
//! A corrupt or unreadable payload is a miss, never an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use concierge_storage::{KeyValueStore, StorageError};
use concierge_types::CorpusVersion;

use crate::model::Embedding;

/// Store key prefix for cached embedding sets.
pub const CACHE_KEY_PREFIX: &str = "embeddings";

/// A cached set of vectors plus the identity it was computed for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEmbeddingSet {
    pub model_id: String,
    pub corpus_version: CorpusVersion,
    pub item_ids: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
}

/// Embedding cache over the durable key-value store.
///
/// One cache instance covers one corpus family (`scope`); the agenda
/// session corpus and the full event corpus are cached independently.
#[derive(Clone)]
pub struct EmbeddingCache {
    store: Arc<dyn KeyValueStore>,
    scope: String,
}

impl EmbeddingCache {
    pub fn new(store: Arc<dyn KeyValueStore>, scope: impl Into<String>) -> Self {
        Self {
            store,
            scope: scope.into(),
        }
    }

    fn key(&self, event_id: &str) -> String {
        format!("{}:{}:{}", CACHE_KEY_PREFIX, self.scope, event_id)
    }

    /// Read cached vectors, or `None` on any mismatch.
    pub fn read(
        &self,
        event_id: &str,
        version: &CorpusVersion,
        model_id: &str,
        item_ids: &[String],
    ) -> Option<Vec<Embedding>> {
        let raw = match self.store.get(&self.key(event_id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "Embedding cache read failed, recomputing");
                return None;
            }
        };

        let cached: CachedEmbeddingSet = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(err) => {
                debug!(error = %err, "Discarding corrupt embedding cache entry");
                return None;
            }
        };

        if cached.model_id != model_id || &cached.corpus_version != version {
            debug!(
                cached_version = %cached.corpus_version,
                current_version = %version,
                "Embedding cache stale"
            );
            return None;
        }

        if cached.item_ids.len() != item_ids.len() || cached.vectors.len() != item_ids.len() {
            return None;
        }

        let exact_ids = cached
            .item_ids
            .iter()
            .zip(item_ids.iter())
            .all(|(cached_id, current_id)| cached_id == current_id);
        if !exact_ids {
            return None;
        }

        debug!(count = item_ids.len(), scope = %self.scope, "Embedding cache hit");
        Some(
            cached
                .vectors
                .into_iter()
                .map(Embedding::from_values)
                .collect(),
        )
    }

    /// Persist a computed set, overwriting any prior entry.
    ///
    /// Callers log a failure and keep the in-memory vectors; a device that
    /// cannot persist still works for the rest of the session.
    pub fn write(
        &self,
        event_id: &str,
        version: &CorpusVersion,
        model_id: &str,
        item_ids: &[String],
        vectors: &[Embedding],
    ) -> Result<(), StorageError> {
        let payload = CachedEmbeddingSet {
            model_id: model_id.to_string(),
            corpus_version: version.clone(),
            item_ids: item_ids.to_vec(),
            vectors: vectors.iter().map(|v| v.values.clone()).collect(),
        };

        let raw = serde_json::to_string(&payload)?;
        self.store.set(&self.key(event_id), &raw)
    }

    /// Explicitly drop the cached set for an event.
    pub fn invalidate(&self, event_id: &str) -> Result<(), StorageError> {
        self.store.remove(&self.key(event_id))
    }
}
