//! User preference flags.
//!
//! The assistant toggle gates every model load: when disabled, engine
//! operations fail before any inference work is queued.

use std::sync::Arc;

use tracing::warn;

use crate::error::StorageError;
use crate::store::KeyValueStore;

/// Store key for the assistant opt-in flag.
pub const ASSISTANT_ENABLED_KEY: &str = "assistant_enabled";

/// Lenient boolean parsing for values that may predate this build.
fn to_bool(value: &str) -> bool {
    matches!(value, "true" | "1")
}

/// Preference flags persisted in the key-value store.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Whether the user has opted in to on-device models.
    ///
    /// An unreadable flag counts as disabled; opting in is explicit.
    pub fn assistant_enabled(&self) -> bool {
        match self.store.get(ASSISTANT_ENABLED_KEY) {
            Ok(Some(value)) => to_bool(&value),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "Unable to read assistant preference");
                false
            }
        }
    }

    /// Persist the assistant opt-in flag.
    pub fn set_assistant_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.store
            .set(ASSISTANT_ENABLED_KEY, if enabled { "true" } else { "false" })
    }
}
