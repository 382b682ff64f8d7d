//! End-to-end engine tests with a deterministic stub encoder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use concierge_embeddings::{
    EmbeddingError, EncoderOutput, EncoderProvider, ModelInfo, NullStatusSink, StatusSink,
    TextEncoder,
};
use concierge_engine::{build_corpus, CatalogPayload, ConciergeEngine, EngineError};
use concierge_retrieval::{AnswerModel, ExtractiveAnswer, RankedMatch, RetrievalError};
use concierge_scheduler::PlannerFilters;
use concierge_storage::{KeyValueStore, MemoryStore, StorageError};
use concierge_types::{
    Announcement, ConferenceInfo, CorpusVersion, Session, Settings, Vendor,
};

const STUB_MODEL: &str = "stub/deterministic-encoder";

/// Deterministic 4-dim vectors from text bytes; counts encoded texts.
struct StubEncoder {
    info: ModelInfo,
    encoded_texts: Arc<AtomicUsize>,
}

impl TextEncoder for StubEncoder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn encode(&self, texts: &[String]) -> Result<EncoderOutput, EmbeddingError> {
        self.encoded_texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(EncoderOutput::Rows(
            texts
                .iter()
                .map(|text| {
                    let mut acc = [0.1f32; 4];
                    for (index, byte) in text.bytes().enumerate() {
                        acc[index % 4] += f32::from(byte) / 255.0;
                    }
                    acc.to_vec()
                })
                .collect(),
        ))
    }
}

struct StubProvider {
    encoder: Arc<StubEncoder>,
}

impl StubProvider {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let encoder = Arc::new(StubEncoder {
            info: ModelInfo {
                name: "stub".to_string(),
                dimension: 4,
                max_sequence_length: 64,
            },
            encoded_texts: counter.clone(),
        });
        (Self { encoder }, counter)
    }
}

impl EncoderProvider for StubProvider {
    fn model_id(&self) -> &str {
        STUB_MODEL
    }

    fn encoder(&self, _sink: &dyn StatusSink) -> Result<Arc<dyn TextEncoder>, EmbeddingError> {
        Ok(self.encoder.clone())
    }
}

/// Store whose writes always fail; reads and removes pass through.
struct QuotaExhaustedStore {
    inner: MemoryStore,
}

impl KeyValueStore for QuotaExhaustedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Preference writes go to the same store; only embedding payloads fail
        if key.starts_with("embeddings:") {
            return Err(StorageError::Serialization(format!(
                "quota exceeded writing {} bytes",
                value.len()
            )));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

struct StubAnswerModel {
    calls: Arc<AtomicUsize>,
}

impl AnswerModel for StubAnswerModel {
    fn answer(&self, question: &str, context: &str) -> Result<ExtractiveAnswer, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!question.is_empty());
        assert!(!context.is_empty());
        Ok(ExtractiveAnswer {
            text: "Hall A at 9:00 AM".to_string(),
            score: 0.87,
        })
    }
}

fn session(id: &str, day: &str, time: &str, title: &str) -> Session {
    Session {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("About {title}"),
        day: day.to_string(),
        time: time.to_string(),
        ..Session::default()
    }
}

fn sessions_fixture() -> Vec<Session> {
    vec![
        session("s1", "Day 1", "9:00 AM - 10:00 AM", "Async Rust in production"),
        session("s2", "Day 1", "9:30 AM - 10:30 AM", "Embedded firmware"),
        session("s3", "Day 1", "10:00 AM - 11:00 AM", "Tokio internals"),
        session("s4", "Day 2", "9:00 AM - 10:00 AM", "WebAssembly tooling"),
        session("s5", "Day 2", "11:00 AM - 12:00 PM", "Database engines"),
    ]
}

fn engine_with_store(store: Arc<dyn KeyValueStore>) -> (ConciergeEngine, Arc<AtomicUsize>) {
    let (provider, counter) = StubProvider::new();
    let engine = ConciergeEngine::new(
        Settings::default(),
        store,
        Arc::new(provider),
        Arc::new(NullStatusSink),
    );
    engine.set_assistant_enabled(true).unwrap();
    (engine, counter)
}

fn engine() -> (ConciergeEngine, Arc<AtomicUsize>) {
    engine_with_store(Arc::new(MemoryStore::new()))
}

fn corpus_fixture() -> CatalogPayload {
    CatalogPayload {
        sessions: sessions_fixture(),
        vendors: vec![Vendor {
            id: "v1".to_string(),
            name: "Ferrous Widgets".to_string(),
            deal: "Free stickers".to_string(),
            booth: "7".to_string(),
            ..Vendor::default()
        }],
        announcements: vec![Announcement {
            id: "a1".to_string(),
            title: "Lunch moved to noon".to_string(),
            body: "Catering update".to_string(),
            ..Announcement::default()
        }],
        conference: ConferenceInfo {
            id: "conf".to_string(),
            name: "RustWeek".to_string(),
            city: "Amsterdam".to_string(),
            ..ConferenceInfo::default()
        },
        version: CorpusVersion::new("v3"),
    }
}

#[tokio::test]
async fn test_build_itinerary_is_feasible() {
    let (engine, _) = engine();
    let sessions = sessions_fixture();

    let itinerary = engine
        .build_itinerary(
            "ev1",
            &CorpusVersion::new("v3"),
            &sessions,
            "async rust and tokio",
            &PlannerFilters {
                max_sessions: 3,
                ..PlannerFilters::default()
            },
        )
        .await
        .unwrap();

    assert!(!itinerary.is_empty());
    assert!(itinerary.len() <= 3);
    for pair in itinerary.windows(2) {
        assert!(pair[0].end_abs <= pair[1].start_abs);
    }
}

#[tokio::test]
async fn test_build_itinerary_is_idempotent_with_cache() {
    let (engine, counter) = engine();
    let sessions = sessions_fixture();
    let version = CorpusVersion::new("v3");
    let filters = PlannerFilters {
        max_sessions: 4,
        ..PlannerFilters::default()
    };

    let first = engine
        .build_itinerary("ev1", &version, &sessions, "systems talks", &filters)
        .await
        .unwrap();
    let after_first = counter.load(Ordering::SeqCst);

    let second = engine
        .build_itinerary("ev1", &version, &sessions, "systems talks", &filters)
        .await
        .unwrap();
    let after_second = counter.load(Ordering::SeqCst);

    // Second run embeds only the query; corpus vectors came from cache
    assert_eq!(after_second - after_first, 1);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.session.id, b.session.id);
        assert_eq!(a.similarity.to_bits(), b.similarity.to_bits());
        assert_eq!(a.weight.to_bits(), b.weight.to_bits());
    }
}

#[tokio::test]
async fn test_changed_item_id_recomputes_whole_corpus() {
    let (engine, counter) = engine();
    let mut sessions = sessions_fixture();
    let version = CorpusVersion::new("v3");
    let filters = PlannerFilters::default();

    engine
        .build_itinerary("ev1", &version, &sessions, "rust", &filters)
        .await
        .unwrap();
    let baseline = counter.load(Ordering::SeqCst);
    assert_eq!(baseline, sessions.len() + 1);

    // One changed identifier voids the whole cached set
    sessions[2].id = "s3-renamed".to_string();
    engine
        .build_itinerary("ev1", &version, &sessions, "rust", &filters)
        .await
        .unwrap();

    let after = counter.load(Ordering::SeqCst);
    assert_eq!(after - baseline, sessions.len() + 1);
}

#[tokio::test]
async fn test_changed_version_recomputes_whole_corpus() {
    let (engine, counter) = engine();
    let sessions = sessions_fixture();
    let filters = PlannerFilters::default();

    engine
        .build_itinerary("ev1", &CorpusVersion::new("v3"), &sessions, "rust", &filters)
        .await
        .unwrap();
    let baseline = counter.load(Ordering::SeqCst);

    engine
        .build_itinerary("ev1", &CorpusVersion::new("v4"), &sessions, "rust", &filters)
        .await
        .unwrap();

    assert_eq!(
        counter.load(Ordering::SeqCst) - baseline,
        sessions.len() + 1
    );
}

#[tokio::test]
async fn test_clear_cache_forces_recompute() {
    let (engine, counter) = engine();
    let sessions = sessions_fixture();
    let version = CorpusVersion::new("v3");
    let filters = PlannerFilters::default();

    engine
        .build_itinerary("ev1", &version, &sessions, "rust", &filters)
        .await
        .unwrap();
    let baseline = counter.load(Ordering::SeqCst);

    engine.clear_cache("ev1").unwrap();
    engine
        .build_itinerary("ev1", &version, &sessions, "rust", &filters)
        .await
        .unwrap();

    assert_eq!(
        counter.load(Ordering::SeqCst) - baseline,
        sessions.len() + 1
    );
}

#[tokio::test]
async fn test_disabled_assistant_fails_before_encoding() {
    let (engine, counter) = engine();
    engine.set_assistant_enabled(false).unwrap();

    let result = engine
        .build_itinerary(
            "ev1",
            &CorpusVersion::new("v3"),
            &sessions_fixture(),
            "rust",
            &PlannerFilters::default(),
        )
        .await;

    assert!(matches!(result, Err(EngineError::AssistantDisabled)));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_interest_is_rejected() {
    let (engine, _) = engine();
    let result = engine
        .build_itinerary(
            "ev1",
            &CorpusVersion::new("v3"),
            &sessions_fixture(),
            "   ",
            &PlannerFilters::default(),
        )
        .await;
    assert!(matches!(result, Err(EngineError::EmptyQuery)));
}

#[tokio::test]
async fn test_empty_session_list_yields_empty_itinerary() {
    let (engine, _) = engine();
    let itinerary = engine
        .build_itinerary(
            "ev1",
            &CorpusVersion::new("v3"),
            &[],
            "rust",
            &PlannerFilters::default(),
        )
        .await
        .unwrap();
    assert!(itinerary.is_empty());
}

#[tokio::test]
async fn test_storage_write_failure_is_non_fatal() {
    let store = Arc::new(QuotaExhaustedStore {
        inner: MemoryStore::new(),
    });
    let (engine, counter) = engine_with_store(store);
    let sessions = sessions_fixture();
    let version = CorpusVersion::new("v3");

    let itinerary = engine
        .build_itinerary("ev1", &version, &sessions, "rust", &PlannerFilters::default())
        .await
        .unwrap();
    assert!(!itinerary.is_empty());

    // Nothing persisted, so the next build recomputes everything
    let baseline = counter.load(Ordering::SeqCst);
    engine
        .build_itinerary("ev1", &version, &sessions, "rust", &PlannerFilters::default())
        .await
        .unwrap();
    assert_eq!(
        counter.load(Ordering::SeqCst) - baseline,
        sessions.len() + 1
    );
}

#[tokio::test]
async fn test_retrieve_top_matches_ranked_and_truncated() {
    let (engine, _) = engine();
    let payload = corpus_fixture();
    let corpus = build_corpus(&payload, "ev1");

    let matches = engine
        .retrieve_top_matches("ev1", &payload.version, &corpus, "where are the stickers", 3)
        .await
        .unwrap();

    assert_eq!(matches.len(), 3);
    for pair in matches.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_answer_question_uses_top_matches() {
    let (engine, _) = engine();
    let payload = corpus_fixture();
    let corpus = build_corpus(&payload, "ev1");

    let matches = engine
        .retrieve_top_matches("ev1", &payload.version, &corpus, "when does lunch start", 5)
        .await
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let model = Arc::new(StubAnswerModel {
        calls: calls.clone(),
    });

    let answer = engine
        .answer_question("when does lunch start", &matches, model)
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(answer.text, "Hall A at 9:00 AM");
    assert!((answer.score - 0.87).abs() < 1e-6);
    assert_eq!(answer.sources.len(), 3);
}

#[tokio::test]
async fn test_answer_question_with_no_matches_skips_model() {
    let (engine, _) = engine();
    let calls = Arc::new(AtomicUsize::new(0));
    let model = Arc::new(StubAnswerModel {
        calls: calls.clone(),
    });

    let matches: Vec<RankedMatch> = Vec::new();
    let answer = engine
        .answer_question("anything?", &matches, model)
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(answer.score, 0.0);
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn test_day_filter_limits_itinerary() {
    let (engine, _) = engine();
    let sessions = sessions_fixture();

    let itinerary = engine
        .build_itinerary(
            "ev1",
            &CorpusVersion::new("v3"),
            &sessions,
            "rust",
            &PlannerFilters {
                day: Some("Day 2".to_string()),
                max_sessions: 8,
                ..PlannerFilters::default()
            },
        )
        .await
        .unwrap();

    assert!(!itinerary.is_empty());
    assert!(itinerary.iter().all(|c| c.session.day == "Day 2"));
}
