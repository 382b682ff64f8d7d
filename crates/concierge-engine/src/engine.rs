//! The concierge engine.
//!
//! Explicitly constructed, caller-owned service: one instance per process
//! owns the inference queue, both embedding caches, and the encoder
//! provider, and is passed by reference to every call site. All model
//! invocations (corpus embedding, query embedding, answer extraction)
//! go through the single-flight queue.

use std::sync::Arc;

use tracing::{debug, info, warn};

use concierge_embeddings::{
    Embedding, EmbeddingCache, EncoderAdapter, EncoderProvider, InferenceQueue, StatusSink,
};
use concierge_retrieval::{
    build_answer_context, rank_corpus, AnswerModel, ContextBudget, RankedMatch,
};
use concierge_scheduler::{
    build_candidates, clamp_max_sessions, weighted_interval_schedule, PlannerFilters,
    ScheduleCandidate,
};
use concierge_storage::{KeyValueStore, Preferences};
use concierge_types::{truncate_chars, CorpusSnippet, CorpusVersion, Session, Settings};

use crate::corpus::{build_session_text, snippet_identity};
use crate::error::EngineError;

/// Cache scope for agenda session embeddings.
const AGENDA_SCOPE: &str = "agenda";

/// Cache scope for the full event corpus.
const EVENT_SCOPE: &str = "event";

/// Maximum extracted-answer length in characters.
pub const ANSWER_LIMIT: usize = 260;

/// A short answer with the snippets that evidenced it.
#[derive(Debug, Clone)]
pub struct ConciergeAnswer {
    pub text: String,
    pub score: f32,
    pub sources: Vec<RankedMatch>,
}

/// The semantic retrieval and scheduling engine.
pub struct ConciergeEngine {
    settings: Settings,
    provider: Arc<dyn EncoderProvider>,
    status: Arc<dyn StatusSink>,
    queue: InferenceQueue,
    preferences: Preferences,
    agenda_cache: EmbeddingCache,
    event_cache: EmbeddingCache,
}

impl ConciergeEngine {
    /// Construct the engine.
    ///
    /// Must be called within a tokio runtime (the queue spawns its
    /// worker here).
    pub fn new(
        settings: Settings,
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn EncoderProvider>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            preferences: Preferences::new(store.clone()),
            agenda_cache: EmbeddingCache::new(store.clone(), AGENDA_SCOPE),
            event_cache: EmbeddingCache::new(store, EVENT_SCOPE),
            queue: InferenceQueue::new(),
            settings,
            provider,
            status,
        }
    }

    /// Whether the user has opted in to on-device models.
    pub fn assistant_enabled(&self) -> bool {
        self.preferences.assistant_enabled()
    }

    /// Persist the assistant opt-in flag.
    pub fn set_assistant_enabled(&self, enabled: bool) -> Result<(), EngineError> {
        self.preferences.set_assistant_enabled(enabled)?;
        info!(enabled, "Assistant preference updated");
        Ok(())
    }

    /// Fail fast before any queueing when the assistant is off.
    fn ensure_enabled(&self) -> Result<(), EngineError> {
        if self.preferences.assistant_enabled() {
            Ok(())
        } else {
            Err(EngineError::AssistantDisabled)
        }
    }

    /// Embed texts through the single-flight queue.
    ///
    /// The whole load-and-encode step runs as one queued task on the
    /// blocking pool; concurrent callers line up behind it.
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Embedding>, EngineError> {
        let provider = self.provider.clone();
        let status = self.status.clone();
        let batch_size = self.settings.encoder.batch_size;

        let joined = self
            .queue
            .run(move || async move {
                tokio::task::spawn_blocking(move || {
                    let encoder = provider.encoder(status.as_ref())?;
                    let adapter = EncoderAdapter::new(encoder, batch_size);
                    adapter.embed(&texts)
                })
                .await
            })
            .await?;

        let vectors = joined.map_err(|e| EngineError::Task(e.to_string()))??;
        Ok(vectors)
    }

    /// Get corpus vectors, from cache when identity matches exactly.
    async fn ensure_embeddings(
        &self,
        cache: &EmbeddingCache,
        event_id: &str,
        version: &CorpusVersion,
        item_ids: &[String],
        texts: Vec<String>,
    ) -> Result<Vec<Embedding>, EngineError> {
        let model_id = self.provider.model_id().to_string();

        if let Some(vectors) = cache.read(event_id, version, &model_id, item_ids) {
            return Ok(vectors);
        }

        let vectors = self.embed_texts(texts).await?;

        // A device that cannot persist still serves this session
        if let Err(err) = cache.write(event_id, version, &model_id, item_ids, &vectors) {
            warn!(error = %err, "Unable to cache embeddings");
        }

        Ok(vectors)
    }

    /// Embed one query text.
    async fn embed_query(&self, query: &str) -> Result<Embedding, EngineError> {
        let mut vectors = self.embed_texts(vec![query.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EngineError::Task("query embedding missing".to_string()))
    }

    /// Build a non-overlapping personal agenda from free-text interest.
    ///
    /// Pure given deterministic embeddings: identical corpus, version, and
    /// interest yield an identical itinerary. Zero feasible sessions is an
    /// empty itinerary, not an error.
    pub async fn build_itinerary(
        &self,
        event_id: &str,
        version: &CorpusVersion,
        sessions: &[Session],
        interest: &str,
        filters: &PlannerFilters,
    ) -> Result<Vec<ScheduleCandidate>, EngineError> {
        let interest = truncate_chars(interest.trim(), self.settings.planner.interest_limit);
        if interest.is_empty() {
            return Err(EngineError::EmptyQuery);
        }
        self.ensure_enabled()?;

        let item_ids: Vec<String> = sessions.iter().map(|s| s.id.clone()).collect();
        let texts: Vec<String> = sessions.iter().map(build_session_text).collect();

        let vectors = self
            .ensure_embeddings(&self.agenda_cache, event_id, version, &item_ids, texts)
            .await?;
        let query = self.embed_query(&interest).await?;

        let candidates = build_candidates(
            sessions,
            &vectors,
            &query,
            filters,
            self.settings.planner.category_boost,
        );

        let requested = if filters.max_sessions == 0 {
            self.settings.planner.default_max_sessions
        } else {
            filters.max_sessions
        };
        let itinerary = weighted_interval_schedule(candidates, clamp_max_sessions(requested));

        debug!(
            event = event_id,
            sessions = sessions.len(),
            selected = itinerary.len(),
            "Built itinerary"
        );
        Ok(itinerary)
    }

    /// Rank the event corpus against a free-text question.
    pub async fn retrieve_top_matches(
        &self,
        event_id: &str,
        version: &CorpusVersion,
        corpus: &[CorpusSnippet],
        question: &str,
        k: usize,
    ) -> Result<Vec<RankedMatch>, EngineError> {
        let question = truncate_chars(question.trim(), self.settings.retrieval.question_limit);
        if question.is_empty() {
            return Err(EngineError::EmptyQuery);
        }
        self.ensure_enabled()?;

        let item_ids: Vec<String> = corpus.iter().map(snippet_identity).collect();
        let texts: Vec<String> = corpus.iter().map(|s| s.text.clone()).collect();

        let vectors = self
            .ensure_embeddings(&self.event_cache, event_id, version, &item_ids, texts)
            .await?;
        let query = self.embed_query(&question).await?;

        Ok(rank_corpus(corpus, &vectors, &query, k))
    }

    /// Extract a short answer from the top matches.
    ///
    /// Empty matches (or an empty assembled context) yield an empty-state
    /// answer without invoking the model.
    pub async fn answer_question(
        &self,
        question: &str,
        matches: &[RankedMatch],
        model: Arc<dyn AnswerModel>,
    ) -> Result<ConciergeAnswer, EngineError> {
        let question = truncate_chars(question.trim(), self.settings.retrieval.question_limit);
        if question.is_empty() {
            return Err(EngineError::EmptyQuery);
        }

        let budget = ContextBudget {
            items: self.settings.retrieval.context_items,
            snippet_chars: self.settings.retrieval.context_snippet_chars,
            total_chars: self.settings.retrieval.context_total_chars,
        };
        let context = build_answer_context(matches, &budget);
        if context.is_empty() {
            return Ok(ConciergeAnswer {
                text: "No relevant context available.".to_string(),
                score: 0.0,
                sources: Vec::new(),
            });
        }
        self.ensure_enabled()?;

        let joined = self
            .queue
            .run(move || async move {
                tokio::task::spawn_blocking(move || model.answer(&question, &context)).await
            })
            .await?;
        let answer = joined.map_err(|e| EngineError::Task(e.to_string()))??;

        Ok(ConciergeAnswer {
            text: truncate_chars(&answer.text, ANSWER_LIMIT),
            score: answer.score,
            sources: matches
                .iter()
                .take(self.settings.retrieval.context_items)
                .cloned()
                .collect(),
        })
    }

    /// Drop both cached embedding sets for an event.
    pub fn clear_cache(&self, event_id: &str) -> Result<(), EngineError> {
        self.agenda_cache.invalidate(event_id)?;
        self.event_cache.invalidate(event_id)?;
        info!(event = event_id, "Cleared embedding caches");
        Ok(())
    }
}
