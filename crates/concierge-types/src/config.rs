//! Configuration loading.
//!
//! Layered precedence: built-in defaults -> config file
//! (~/.config/event-concierge/config.toml) -> environment variables
//! (CONCIERGE_*). CLI flags are applied by the caller after loading.

use ::config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConciergeError;

/// Encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// Embedding model repository id
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Texts per encode call; bounds peak memory and latency
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Prefer an accelerated device when the probe succeeds
    #[serde(default = "default_true")]
    pub prefer_accelerated: bool,

    /// Request reduced-precision weights on first load
    #[serde(default = "default_true")]
    pub reduced_precision: bool,
}

fn default_model_id() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_batch_size() -> usize {
    8
}

fn default_true() -> bool {
    true
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            batch_size: default_batch_size(),
            prefer_accelerated: true,
            reduced_precision: true,
        }
    }
}

/// Retrieval and answer-context settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Matches returned by a top-K query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Matches whose text feeds the answer context
    #[serde(default = "default_context_items")]
    pub context_items: usize,

    /// Per-item character budget inside the answer context
    #[serde(default = "default_context_snippet_chars")]
    pub context_snippet_chars: usize,

    /// Total answer-context character budget
    #[serde(default = "default_context_total_chars")]
    pub context_total_chars: usize,

    /// Maximum question length in characters
    #[serde(default = "default_question_limit")]
    pub question_limit: usize,
}

fn default_top_k() -> usize {
    5
}

fn default_context_items() -> usize {
    3
}

fn default_context_snippet_chars() -> usize {
    220
}

fn default_context_total_chars() -> usize {
    700
}

fn default_question_limit() -> usize {
    260
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            context_items: default_context_items(),
            context_snippet_chars: default_context_snippet_chars(),
            context_total_chars: default_context_total_chars(),
            question_limit: default_question_limit(),
        }
    }
}

/// Agenda planner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Default itinerary size when the caller does not pick one
    #[serde(default = "default_max_sessions")]
    pub default_max_sessions: usize,

    /// Maximum interest-text length in characters
    #[serde(default = "default_interest_limit")]
    pub interest_limit: usize,

    /// Weight bonus applied to boosted-category sessions
    #[serde(default = "default_category_boost")]
    pub category_boost: f32,
}

fn default_max_sessions() -> usize {
    4
}

fn default_interest_limit() -> usize {
    240
}

fn default_category_boost() -> f32 {
    0.08
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            default_max_sessions: default_max_sessions(),
            interest_limit: default_interest_limit(),
            category_boost: default_category_boost(),
        }
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB store backing the embedding cache and preferences
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Root directory of per-event catalog JSON
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub encoder: EncoderSettings,

    #[serde(default)]
    pub retrieval: RetrievalSettings,

    #[serde(default)]
    pub planner: PlannerSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "event-concierge")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data/db"))
        .to_string_lossy()
        .to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            encoder: EncoderSettings::default(),
            retrieval: RetrievalSettings::default(),
            planner: PlannerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/event-concierge/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CONCIERGE_*)
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConciergeError> {
        let config_dir = ProjectDirs::from("", "", "event-concierge")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| ConciergeError::Config(e.to_string()))?
            .set_default("data_dir", default_data_dir())
            .map_err(|e| ConciergeError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ConciergeError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: CONCIERGE_DB_PATH, CONCIERGE_ENCODER__BATCH_SIZE, etc.
        builder = builder.add_source(
            Environment::with_prefix("CONCIERGE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConciergeError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConciergeError::Config(e.to_string()))
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConciergeError> {
        if self.encoder.batch_size == 0 {
            return Err(ConciergeError::Config(
                "encoder.batch_size must be > 0".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConciergeError::Config(
                "retrieval.top_k must be > 0".to_string(),
            ));
        }
        if self.retrieval.context_total_chars < self.retrieval.context_snippet_chars {
            return Err(ConciergeError::Config(
                "retrieval.context_total_chars must cover at least one snippet".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.planner.category_boost) {
            return Err(ConciergeError::Config(format!(
                "planner.category_boost must be 0.0-1.0, got {}",
                self.planner.category_boost
            )));
        }
        Ok(())
    }

    /// Expand ~ in db_path to the home directory.
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(stripped) = self.db_path.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(stripped);
            }
        }
        PathBuf::from(&self.db_path)
    }
}
