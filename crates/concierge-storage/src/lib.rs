//! Durable key-value storage for the event concierge engine.
//!
//! A deliberately narrow string-keyed store backs the embedding cache and
//! user preference flags. There is no atomicity guarantee across keys, and
//! callers treat write failures as non-fatal: a device that cannot persist
//! still serves the current session from memory.

pub mod error;
pub mod preferences;
pub mod store;

pub use error::StorageError;
pub use preferences::{Preferences, ASSISTANT_ENABLED_KEY};
pub use store::{KeyValueStore, MemoryStore, RocksStore};
