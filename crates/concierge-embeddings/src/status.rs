//! Model load status reporting.
//!
//! Encoder loading is slow enough (download + weight mapping) that callers
//! want discrete phase transitions: idle -> loading -> downloading ->
//! ready/error. Statuses go to a pluggable sink; the default just logs.

use concierge_types::truncate_chars;
use tracing::{error, info, warn};

/// Longest status message shown to a user.
pub const STATUS_MESSAGE_LIMIT: usize = 120;

/// Discrete load phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Downloading,
    Ready,
    Error,
}

impl LoadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadPhase::Idle => "idle",
            LoadPhase::Loading => "loading",
            LoadPhase::Downloading => "downloading",
            LoadPhase::Ready => "ready",
            LoadPhase::Error => "error",
        }
    }
}

/// One status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStatus {
    pub phase: LoadPhase,
    pub message: String,
}

impl LoadStatus {
    pub fn new(phase: LoadPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: truncate_chars(&message.into(), STATUS_MESSAGE_LIMIT),
        }
    }
}

/// Receives status transitions from loaders.
pub trait StatusSink: Send + Sync {
    fn emit(&self, status: LoadStatus);
}

/// Default sink: routes statuses into the log stream.
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn emit(&self, status: LoadStatus) {
        match status.phase {
            LoadPhase::Error => error!(message = %status.message, "Model status"),
            LoadPhase::Downloading => warn!(message = %status.message, "Model status"),
            _ => info!(phase = status.phase.as_str(), message = %status.message, "Model status"),
        }
    }
}

/// Sink that drops everything (headless callers).
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn emit(&self, _status: LoadStatus) {}
}

/// Progress notifications surfaced while model files are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Fetch is starting
    Initiate,
    /// Counters advanced (bytes or file counts, whatever is available)
    Progress { loaded: u64, total: u64 },
    /// All files fetched, finalizing
    Done,
    /// Model is usable
    Ready,
}

/// Percentage from progress counters, when the total is meaningful.
pub fn percent(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let ratio = loaded as f64 / total as f64;
    Some(((ratio * 100.0).round() as u64).min(100) as u8)
}

/// Map a progress event to the status shown to the user.
pub fn progress_status(event: &ProgressEvent) -> LoadStatus {
    match event {
        ProgressEvent::Initiate => LoadStatus::new(LoadPhase::Loading, "Loading model…"),
        ProgressEvent::Progress { loaded, total } => match percent(*loaded, *total) {
            Some(p) => LoadStatus::new(
                LoadPhase::Downloading,
                format!("Downloading model… {p}%"),
            ),
            None => LoadStatus::new(LoadPhase::Downloading, "Downloading model…"),
        },
        ProgressEvent::Done => LoadStatus::new(LoadPhase::Loading, "Finalizing model…"),
        ProgressEvent::Ready => LoadStatus::new(LoadPhase::Ready, "Model is ready."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_from_counters() {
        assert_eq!(percent(50, 200), Some(25));
        assert_eq!(percent(200, 200), Some(100));
        assert_eq!(percent(250, 200), Some(100)); // clamped
    }

    #[test]
    fn test_percent_without_total() {
        assert_eq!(percent(10, 0), None);
    }

    #[test]
    fn test_progress_status_mapping() {
        assert_eq!(
            progress_status(&ProgressEvent::Initiate).phase,
            LoadPhase::Loading
        );

        let downloading = progress_status(&ProgressEvent::Progress {
            loaded: 1,
            total: 4,
        });
        assert_eq!(downloading.phase, LoadPhase::Downloading);
        assert!(downloading.message.contains("25%"));

        assert_eq!(progress_status(&ProgressEvent::Ready).phase, LoadPhase::Ready);
    }

    #[test]
    fn test_status_message_truncated() {
        let long = "x".repeat(500);
        let status = LoadStatus::new(LoadPhase::Loading, long);
        assert_eq!(status.message.chars().count(), STATUS_MESSAGE_LIMIT);
    }
}
