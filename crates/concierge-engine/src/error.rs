//! Engine error types.

use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// Inference-path failures surface to the calling operation only; the
/// queue and caches stay usable for subsequent independent calls.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The user has not opted in to on-device models
    #[error("Assistant is disabled. Enable the assistant to load models.")]
    AssistantDisabled,

    /// The query or interest text was empty after trimming
    #[error("Query text is empty")]
    EmptyQuery,

    /// Embedding pipeline failure (load or encode)
    #[error(transparent)]
    Embedding(#[from] concierge_embeddings::EmbeddingError),

    /// The inference queue shut down
    #[error(transparent)]
    Queue(#[from] concierge_embeddings::QueueError),

    /// Answer extraction failure
    #[error(transparent)]
    Retrieval(#[from] concierge_retrieval::RetrievalError),

    /// Catalog loading failure
    #[error(transparent)]
    Catalog(#[from] concierge_types::ConciergeError),

    /// Storage failure on an explicit operation (cache clearing)
    #[error(transparent)]
    Storage(#[from] concierge_storage::StorageError),

    /// A spawned task failed to complete
    #[error("Task failed: {0}")]
    Task(String),
}
