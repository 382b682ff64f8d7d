//! Schedule candidate construction.
//!
//! Each session that survives the user's filters becomes a candidate with
//! an absolute time interval and a strictly positive weight. The +1 shift
//! keeps weights positive even for negative similarity, so the scheduler
//! always fills available capacity and relevance ordering stays with the
//! similarity component.

use serde::Serialize;
use tracing::debug;

use concierge_embeddings::Embedding;
use concierge_types::{absolute_range, Session};

/// Hard cap on itinerary size.
pub const MAX_SESSIONS_CAP: usize = 8;

/// Floor keeping candidate weights strictly positive.
pub const MIN_WEIGHT: f32 = 1e-4;

/// A session that can be placed on the agenda.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleCandidate {
    pub session: Session,
    /// Interval start in minutes-of-week
    pub start_abs: u32,
    /// Interval end in minutes-of-week (exclusive)
    pub end_abs: u32,
    /// Start in minutes-of-day, for earliest-start filtering
    pub start_local: u32,
    pub similarity: f32,
    pub weight: f32,
}

/// User constraints for an agenda build.
#[derive(Debug, Clone, Default)]
pub struct PlannerFilters {
    /// Keep only this day label (`None` = all days)
    pub day: Option<String>,
    /// Minimum local start in minutes-of-day
    pub earliest_start: Option<u32>,
    /// Requested itinerary size (clamped to 1..=MAX_SESSIONS_CAP)
    pub max_sessions: usize,
    /// Boost sessions whose format contains this category
    pub boost_category: Option<String>,
}

/// Clamp a requested itinerary size to the supported range.
pub fn clamp_max_sessions(value: usize) -> usize {
    value.clamp(1, MAX_SESSIONS_CAP)
}

fn category_matches(session: &Session, category: &str) -> bool {
    session
        .session_type
        .to_lowercase()
        .contains(&category.to_lowercase())
}

/// Build weighted candidates from scored sessions.
///
/// Sessions without a parsable time range are not schedulable and are
/// dropped. `vectors` is positionally aligned with `sessions`; a missing
/// vector scores 0.
pub fn build_candidates(
    sessions: &[Session],
    vectors: &[Embedding],
    query: &Embedding,
    filters: &PlannerFilters,
    category_boost: f32,
) -> Vec<ScheduleCandidate> {
    let empty = Embedding::from_values(vec![]);

    let candidates: Vec<ScheduleCandidate> = sessions
        .iter()
        .enumerate()
        .filter_map(|(index, session)| {
            let range = absolute_range(&session.day, &session.time)?;

            if let Some(day) = &filters.day {
                if &session.day != day {
                    return None;
                }
            }

            if let Some(earliest) = filters.earliest_start {
                if range.start_local < earliest {
                    return None;
                }
            }

            let similarity = query.cosine_similarity(vectors.get(index).unwrap_or(&empty));
            let bonus = match &filters.boost_category {
                Some(category) if category_matches(session, category) => category_boost,
                _ => 0.0,
            };
            let weight = (similarity + bonus + 1.0).max(MIN_WEIGHT);

            Some(ScheduleCandidate {
                session: session.clone(),
                start_abs: range.start_abs,
                end_abs: range.end_abs,
                start_local: range.start_local,
                similarity,
                weight,
            })
        })
        .collect();

    debug!(
        total = sessions.len(),
        schedulable = candidates.len(),
        "Built schedule candidates"
    );
    candidates
}
