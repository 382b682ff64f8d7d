//! Model file caching.
//!
//! Downloads and caches encoder model files from HuggingFace Hub, emitting
//! progress statuses as counters advance.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::EmbeddingError;
use crate::status::{progress_status, ProgressEvent, StatusSink};

/// Default model repository on HuggingFace
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Required model files
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Model file cache configuration
#[derive(Debug, Clone)]
pub struct ModelFileCache {
    /// Cache directory path
    pub cache_dir: PathBuf,
    /// Model repository ID
    pub repo_id: String,
}

impl Default for ModelFileCache {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("event-concierge")
            .join("models");

        Self {
            cache_dir,
            repo_id: DEFAULT_MODEL_REPO.to_string(),
        }
    }
}

impl ModelFileCache {
    /// Create a new model file cache with custom settings
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Get the model directory path
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    /// Check if all model files are cached
    pub fn is_cached(&self) -> bool {
        let model_dir = self.model_dir();
        MODEL_FILES.iter().all(|f| model_dir.join(f).exists())
    }

    /// Get path to a specific model file
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }
}

/// Paths to model files
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

/// Get or download model files.
///
/// Returns paths to config.json, tokenizer.json, and model.safetensors.
pub fn get_or_download_model(
    cache: &ModelFileCache,
    sink: &dyn StatusSink,
) -> Result<ModelPaths, EmbeddingError> {
    let model_dir = cache.model_dir();

    if cache.is_cached() {
        debug!(path = ?model_dir, "Using cached model files");
    } else {
        info!(repo = %cache.repo_id, "Downloading model files...");
        download_model_files(cache, sink)?;
    }

    Ok(ModelPaths {
        config: model_dir.join("config.json"),
        tokenizer: model_dir.join("tokenizer.json"),
        weights: model_dir.join("model.safetensors"),
    })
}

/// Download model files from HuggingFace Hub.
///
/// Progress counters are file counts; the hub client does not expose byte
/// totals up front.
fn download_model_files(
    cache: &ModelFileCache,
    sink: &dyn StatusSink,
) -> Result<(), EmbeddingError> {
    use hf_hub::api::sync::Api;

    sink.emit(progress_status(&ProgressEvent::Initiate));

    let api = Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(cache.repo_id.clone());

    std::fs::create_dir_all(cache.model_dir())?;

    let total = MODEL_FILES.len() as u64;
    for (index, filename) in MODEL_FILES.iter().enumerate() {
        info!(file = filename, "Downloading...");
        sink.emit(progress_status(&ProgressEvent::Progress {
            loaded: index as u64,
            total,
        }));

        let source_path = repo
            .get(filename)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", filename, e)))?;

        let dest_path = cache.file_path(filename);
        std::fs::copy(&source_path, &dest_path)?;
        debug!(file = filename, "Downloaded to {:?}", dest_path);
    }

    sink.emit(progress_status(&ProgressEvent::Done));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_default() {
        let cache = ModelFileCache::default();
        assert!(cache.cache_dir.to_string_lossy().contains("event-concierge"));
        assert_eq!(cache.repo_id, DEFAULT_MODEL_REPO);
    }

    #[test]
    fn test_is_cached_empty() {
        let temp = TempDir::new().unwrap();
        let cache = ModelFileCache::new(temp.path(), "test/model");
        assert!(!cache.is_cached());
    }

    #[test]
    fn test_model_dir_flattens_repo_id() {
        let cache = ModelFileCache::new("/tmp/models", "org/model");
        assert!(cache
            .model_dir()
            .to_string_lossy()
            .ends_with("org_model"));
    }
}
