//! # concierge-types
//!
//! Shared domain types for the event concierge engine.
//!
//! This crate defines the core data structures used throughout the system:
//! - Catalog records: sessions, vendors, announcements, conference info
//! - Corpus snippets: the retrievable units built from catalog records
//! - Corpus versions: opaque tokens for cache-validity checks
//! - Time parsing: conference day/clock strings to minutes-of-week
//! - Settings: layered configuration

pub mod catalog;
pub mod config;
pub mod error;
pub mod text;
pub mod time;

pub use catalog::{
    Announcement, ConferenceInfo, CorpusSnippet, CorpusVersion, EventMeta, Session, SnippetKind,
    Vendor,
};
pub use crate::config::{EncoderSettings, PlannerSettings, RetrievalSettings, Settings};
pub use error::ConciergeError;
pub use text::truncate_chars;
pub use time::{
    absolute_range, clock_minutes, day_index, minutes_from_24h, session_range, AbsoluteRange,
    TimeRange,
};
