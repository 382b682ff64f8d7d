//! Catalog source.
//!
//! Catalog content arrives as structured JSON, one directory per event:
//! `sessions.json`, `vendors.json`, `announcements.json`,
//! `conference.json`, and an optional `meta.json` carrying the snapshot
//! version. The version token is the cache key for everything downstream.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use concierge_types::{
    Announcement, ConciergeError, ConferenceInfo, CorpusVersion, EventMeta, Session, Vendor,
};

/// One event's catalog snapshot.
#[derive(Debug, Clone)]
pub struct CatalogPayload {
    pub sessions: Vec<Session>,
    pub vendors: Vec<Vendor>,
    pub announcements: Vec<Announcement>,
    pub conference: ConferenceInfo,
    pub version: CorpusVersion,
}

/// Provides catalog snapshots per event.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the full catalog for an event.
    async fn load(&self, event_id: &str) -> Result<CatalogPayload, ConciergeError>;
}

#[derive(Debug, Default, Deserialize)]
struct SessionsEnvelope {
    #[serde(default)]
    sessions: Vec<Session>,
}

#[derive(Debug, Default, Deserialize)]
struct VendorsEnvelope {
    #[serde(default)]
    vendors: Vec<Vendor>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnouncementsEnvelope {
    #[serde(default)]
    announcements: Vec<Announcement>,
}

/// Filesystem-backed catalog source.
pub struct JsonCatalogSource {
    root: PathBuf,
}

impl JsonCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn event_file(&self, event_id: &str, name: &str) -> PathBuf {
        self.root.join(event_id).join(name)
    }

    async fn read_required<T: serde::de::DeserializeOwned>(
        &self,
        event_id: &str,
        name: &str,
    ) -> Result<T, ConciergeError> {
        let path = self.event_file(event_id, name);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConciergeError::Catalog(format!("Failed to load {:?}: {}", path, e)))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn read_meta(&self, event_id: &str) -> Option<EventMeta> {
        let path = self.event_file(event_id, "meta.json");
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(_) => return None,
        };

        match serde_json::from_str(&raw) {
            Ok(meta) => Some(meta),
            Err(err) => {
                warn!(error = %err, path = ?path, "Ignoring malformed event meta");
                None
            }
        }
    }
}

#[async_trait]
impl CatalogSource for JsonCatalogSource {
    async fn load(&self, event_id: &str) -> Result<CatalogPayload, ConciergeError> {
        let sessions: SessionsEnvelope = self.read_required(event_id, "sessions.json").await?;
        let vendors: VendorsEnvelope = self.read_required(event_id, "vendors.json").await?;
        let announcements: AnnouncementsEnvelope =
            self.read_required(event_id, "announcements.json").await?;
        let conference: ConferenceInfo = self.read_required(event_id, "conference.json").await?;

        let meta = self.read_meta(event_id).await;
        let version = CorpusVersion::from_meta(meta.as_ref());

        debug!(
            event = event_id,
            sessions = sessions.sessions.len(),
            vendors = vendors.vendors.len(),
            announcements = announcements.announcements.len(),
            version = %version,
            "Loaded catalog"
        );

        Ok(CatalogPayload {
            sessions: sessions.sessions,
            vendors: vendors.vendors,
            announcements: announcements.announcements,
            conference,
            version,
        })
    }
}
