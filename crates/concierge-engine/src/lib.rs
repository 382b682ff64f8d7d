//! # concierge-engine
//!
//! The service layer of the event concierge. One `ConciergeEngine` is
//! constructed per process, owns the inference queue and embedding caches,
//! and exposes the user-facing operations: building a personal agenda from
//! free-text interest, ranking catalog content against a question, and
//! extracting a short answer from the best matches.

pub mod catalog;
pub mod corpus;
pub mod engine;
pub mod error;

pub use catalog::{CatalogPayload, CatalogSource, JsonCatalogSource};
pub use corpus::{build_corpus, build_session_text, snippet_identity};
pub use engine::{ConciergeAnswer, ConciergeEngine, ANSWER_LIMIT};
pub use error::EngineError;
