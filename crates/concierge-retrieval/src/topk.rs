//! Top-K corpus ranking.

use tracing::debug;

use concierge_embeddings::Embedding;
use concierge_types::CorpusSnippet;

/// One corpus snippet with its relevance score.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RankedMatch {
    pub snippet: CorpusSnippet,
    pub score: f32,
}

/// Score every snippet against the query and keep the best `k`.
///
/// Results come back in descending score order; equal scores keep their
/// original corpus order (the sort is stable). A snippet without a vector
/// (drifted cache, failed embed) scores 0 rather than erroring.
pub fn rank_corpus(
    snippets: &[CorpusSnippet],
    vectors: &[Embedding],
    query: &Embedding,
    k: usize,
) -> Vec<RankedMatch> {
    let empty = Embedding::from_values(vec![]);

    let mut scored: Vec<RankedMatch> = snippets
        .iter()
        .enumerate()
        .map(|(index, snippet)| RankedMatch {
            snippet: snippet.clone(),
            score: query.cosine_similarity(vectors.get(index).unwrap_or(&empty)),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);

    debug!(total = snippets.len(), kept = scored.len(), "Ranked corpus");
    scored
}
