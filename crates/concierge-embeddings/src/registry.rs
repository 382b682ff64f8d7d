//! Caller-owned encoder registry.
//!
//! Loaded encoders are expensive, so one registry instance lives for the
//! whole session and is passed by reference to call sites. Entries are
//! keyed by (model, resolved device, requested precision); a failed load
//! leaves no entry behind, so a later call retries from scratch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::candle::{CandleEncoder, LoadOptions};
use crate::device::{select_device, DeviceKind, Precision};
use crate::error::EmbeddingError;
use crate::files::ModelFileCache;
use crate::model::{EncoderProvider, TextEncoder};
use crate::status::{progress_status, ProgressEvent, StatusSink};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EncoderKey {
    model_id: String,
    device: DeviceKind,
    precision: Precision,
}

/// Registry of loaded encoders.
#[derive(Default)]
pub struct EncoderRegistry {
    entries: Mutex<HashMap<EncoderKey, Arc<CandleEncoder>>>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a loaded encoder, loading it on first use.
    pub fn get_or_load(
        &self,
        cache: &ModelFileCache,
        options: &LoadOptions,
        sink: &dyn StatusSink,
    ) -> Result<Arc<CandleEncoder>, EmbeddingError> {
        let (device, device_kind) = select_device(options.prefer_accelerated);
        let key = EncoderKey {
            model_id: cache.repo_id.clone(),
            device: device_kind,
            precision: options.precision,
        };

        {
            let entries = self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(encoder) = entries.get(&key) {
                debug!(model = %key.model_id, device = key.device.as_str(), "Encoder registry hit");
                sink.emit(progress_status(&ProgressEvent::Ready));
                return Ok(encoder.clone());
            }
        }

        // Loaded outside the lock; a failure inserts nothing.
        let encoder = Arc::new(CandleEncoder::load_on(
            cache,
            device,
            device_kind,
            options.precision,
            sink,
        )?);

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key, encoder.clone());
        Ok(encoder)
    }

    /// Number of live entries (observability).
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Production encoder provider: registry-backed Candle loads.
pub struct CandleEncoderProvider {
    registry: EncoderRegistry,
    file_cache: ModelFileCache,
    options: LoadOptions,
}

impl CandleEncoderProvider {
    pub fn new(file_cache: ModelFileCache, options: LoadOptions) -> Self {
        Self {
            registry: EncoderRegistry::new(),
            file_cache,
            options,
        }
    }
}

impl EncoderProvider for CandleEncoderProvider {
    fn model_id(&self) -> &str {
        &self.file_cache.repo_id
    }

    fn encoder(&self, sink: &dyn StatusSink) -> Result<Arc<dyn TextEncoder>, EmbeddingError> {
        let encoder = self.registry.get_or_load(&self.file_cache, &self.options, sink)?;
        Ok(encoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_starts_empty() {
        let registry = EncoderRegistry::new();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_load_leaves_no_entry() {
        use crate::status::NullStatusSink;
        use tempfile::TempDir;

        let registry = EncoderRegistry::new();
        let temp = TempDir::new().unwrap();
        // Repo that cannot resolve, with nothing cached locally
        let cache = ModelFileCache::new(temp.path(), "invalid/definitely-missing-model");

        let result = registry.get_or_load(
            &cache,
            &LoadOptions {
                prefer_accelerated: false,
                precision: Precision::Full,
            },
            &NullStatusSink,
        );

        assert!(result.is_err());
        assert!(registry.is_empty());
    }
}
