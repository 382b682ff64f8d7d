//! Catalog record types.
//!
//! One conference event exposes four record families (sessions, vendors,
//! announcements, venue/conference info). All records are immutable once
//! loaded for a given corpus version. Raw feeds are lenient JSON: ids may
//! arrive as strings or numbers, and most fields are optional.

use serde::{Deserialize, Deserializer, Serialize};

/// Accept ids serialized as either JSON strings or numbers.
fn id_from_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// A schedulable conference session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, deserialize_with = "id_from_value")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Day label, e.g. "Day 1"
    #[serde(default)]
    pub day: String,
    /// Clock range, e.g. "9:00 AM - 10:30 AM"
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub track: String,
    /// Session format, e.g. "Talk", "Workshop"
    #[serde(default, rename = "type")]
    pub session_type: String,
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An expo-hall vendor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(default, deserialize_with = "id_from_value")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deal: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub booth: String,
}

/// An event announcement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(default, deserialize_with = "id_from_value")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub date: String,
}

/// Conference/venue metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConferenceInfo {
    #[serde(default, deserialize_with = "id_from_value")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, rename = "dateRange")]
    pub date_range: String,
}

/// Event metadata carrying the catalog snapshot token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMeta {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// Opaque token identifying a catalog content snapshot.
///
/// Cached embeddings are valid only for an exact version match; any change
/// upstream mints a new token and voids the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorpusVersion(String);

impl CorpusVersion {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Fallback token for catalogs without metadata.
    pub fn fallback() -> Self {
        Self("v1".to_string())
    }

    /// Derive a version token from event metadata: explicit version wins,
    /// then the update timestamp, then the fallback.
    pub fn from_meta(meta: Option<&EventMeta>) -> Self {
        meta.and_then(|m| m.version.clone().or_else(|| m.updated_at.clone()))
            .filter(|token| !token.is_empty())
            .map(Self::new)
            .unwrap_or_else(Self::fallback)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorpusVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which record family a corpus snippet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetKind {
    Session,
    Vendor,
    Announcement,
    Venue,
}

impl SnippetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnippetKind::Session => "session",
            SnippetKind::Vendor => "vendor",
            SnippetKind::Announcement => "announcement",
            SnippetKind::Venue => "venue",
        }
    }
}

impl std::fmt::Display for SnippetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A retrievable unit of catalog content.
///
/// The composed `text` is what gets embedded and what the answer context
/// is assembled from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSnippet {
    pub kind: SnippetKind,
    pub source_id: String,
    pub title: String,
    pub text: String,
}

impl CorpusSnippet {
    pub fn new(
        kind: SnippetKind,
        source_id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}
