//! Answer-context assembly.
//!
//! The extractive answer model gets a bounded evidence context built from
//! the best matches: each item is truncated independently to its own
//! snippet budget, then clipped to whatever remains of the total budget.
//! Accumulation stops once the running total reaches the budget, so the
//! context can never exceed it.

use concierge_types::truncate_chars;

use crate::topk::RankedMatch;

/// Character budgets for the evidence context.
#[derive(Debug, Clone, Copy)]
pub struct ContextBudget {
    /// Matches considered for the context
    pub items: usize,
    /// Per-item character budget
    pub snippet_chars: usize,
    /// Total context character budget
    pub total_chars: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            items: 3,
            snippet_chars: 220,
            total_chars: 700,
        }
    }
}

/// Concatenate the top matches' text under the budget.
///
/// Returns an empty string when there is nothing to cite.
pub fn build_answer_context(matches: &[RankedMatch], budget: &ContextBudget) -> String {
    let mut chunks: Vec<String> = Vec::new();
    let mut used = 0usize;

    for item in matches.iter().take(budget.items) {
        if used >= budget.total_chars {
            break;
        }

        let snippet = truncate_chars(&item.snippet.text, budget.snippet_chars);
        let remaining = budget.total_chars - used;
        let clipped = truncate_chars(&snippet, remaining);

        used += clipped.chars().count();
        chunks.push(clipped);
    }

    chunks.join("\n\n")
}
