//! # concierge-scheduler
//!
//! Turns similarity-scored sessions into a feasible personal agenda:
//! filtering and weighting produce schedule candidates, and a
//! cardinality-bounded weighted-interval dynamic program selects the
//! maximum-weight set of non-overlapping sessions.

pub mod candidate;
pub mod interval;

pub use candidate::{
    build_candidates, clamp_max_sessions, PlannerFilters, ScheduleCandidate, MAX_SESSIONS_CAP,
    MIN_WEIGHT,
};
pub use interval::weighted_interval_schedule;
