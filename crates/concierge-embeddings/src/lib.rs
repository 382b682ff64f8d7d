//! # concierge-embeddings
//!
//! Local embedding generation for the event concierge using Candle.
//!
//! The crate owns the full embedding lifecycle:
//! - all-MiniLM-L6-v2 sentence embeddings (384 dimensions), computed
//!   on-device with automatic model file caching
//! - device preference with CPU fallback, and a one-shot precision
//!   fallback when reduced-precision weights fail to load
//! - normalization of heterogeneous encoder output shapes
//! - a single-flight queue serializing every inference call
//! - a persistent per-corpus embedding cache with exact staleness checks

pub mod adapter;
pub mod cache;
pub mod candle;
pub mod device;
pub mod error;
pub mod files;
pub mod model;
pub mod output;
pub mod queue;
pub mod registry;
pub mod status;

pub use adapter::{EncoderAdapter, DEFAULT_BATCH_SIZE};
pub use cache::{CachedEmbeddingSet, EmbeddingCache, CACHE_KEY_PREFIX};
pub use crate::candle::{CandleEncoder, LoadOptions, EMBEDDING_DIM, MAX_SEQ_LENGTH};
pub use device::{select_device, DeviceKind, Precision};
pub use error::{EmbeddingError, QueueError};
pub use files::{get_or_download_model, ModelFileCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use model::{Embedding, EncoderProvider, ModelInfo, TextEncoder, STORED_PRECISION};
pub use output::EncoderOutput;
pub use queue::InferenceQueue;
pub use registry::{CandleEncoderProvider, EncoderRegistry};
pub use status::{
    percent, progress_status, LoadPhase, LoadStatus, NullStatusSink, ProgressEvent, StatusSink,
    TracingStatusSink, STATUS_MESSAGE_LIMIT,
};
