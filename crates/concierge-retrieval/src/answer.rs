//! Extractive answer capability.
//!
//! The answer model is an external collaborator consumed through a narrow
//! contract: one question, one evidence context, one short span with a
//! confidence score. Calls go through the inference queue like every other
//! model invocation.

use crate::error::RetrievalError;

/// A short extracted answer with model confidence.
#[derive(Debug, Clone)]
pub struct ExtractiveAnswer {
    pub text: String,
    pub score: f32,
}

/// Extractive question-answering capability.
pub trait AnswerModel: Send + Sync {
    /// Extract the best answer span for `question` from `context`.
    fn answer(&self, question: &str, context: &str) -> Result<ExtractiveAnswer, RetrievalError>;
}
