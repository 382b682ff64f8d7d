//! # concierge-retrieval
//!
//! Ranks an embedded corpus against a query vector and assembles the
//! bounded evidence context handed to the extractive answer step.

pub mod answer;
pub mod context;
pub mod error;
pub mod topk;

pub use answer::{AnswerModel, ExtractiveAnswer};
pub use context::{build_answer_context, ContextBudget};
pub use error::RetrievalError;
pub use topk::{rank_corpus, RankedMatch};
