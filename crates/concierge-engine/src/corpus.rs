//! Corpus composition.
//!
//! Catalog records become embeddable text here. Sessions get a dense
//! field join for agenda scoring; every record family also gets a short
//! labeled snippet for question answering, with descriptions truncated so
//! one verbose record cannot dominate the context budget.

use concierge_types::{
    truncate_chars, Announcement, ConferenceInfo, CorpusSnippet, Session, SnippetKind, Vendor,
};

use crate::catalog::CatalogPayload;

/// Character budget for a snippet's description part.
const SNIPPET_DESCRIPTION_LIMIT: usize = 180;

/// Compose the text embedded for agenda scoring.
pub fn build_session_text(session: &Session) -> String {
    let tags = session.tags.join(", ");
    [
        session.title.as_str(),
        session.description.as_str(),
        session.track.as_str(),
        session.session_type.as_str(),
        session.speaker.as_str(),
        session.room.as_str(),
        session.day.as_str(),
        session.time.as_str(),
        tags.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .cloned()
    .collect::<Vec<&str>>()
    .join(". ")
}

/// Identity string for cache staleness checks.
///
/// Source ids are only unique within a record family, so the kind is
/// folded in.
pub fn snippet_identity(snippet: &CorpusSnippet) -> String {
    format!("{}:{}", snippet.kind, snippet.source_id)
}

fn session_snippet(session: &Session, index: usize) -> CorpusSnippet {
    let id = if session.id.is_empty() {
        format!("session-{}", index + 1)
    } else {
        session.id.clone()
    };
    let title = if session.title.is_empty() {
        "Session".to_string()
    } else {
        session.title.clone()
    };
    let description = if session.description.is_empty() {
        let track = if session.track.is_empty() {
            "General"
        } else {
            &session.track
        };
        format!("{track} session")
    } else {
        session.description.clone()
    };
    let where_and_when: Vec<&str> = [session.time.as_str(), session.room.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    let where_and_when = if where_and_when.is_empty() {
        "TBA".to_string()
    } else {
        where_and_when.join(" • ")
    };

    CorpusSnippet::new(
        SnippetKind::Session,
        id,
        title.clone(),
        format!(
            "Session: {}. {}. {}",
            title,
            truncate_chars(&description, SNIPPET_DESCRIPTION_LIMIT),
            where_and_when
        ),
    )
}

fn vendor_snippet(vendor: &Vendor, index: usize) -> CorpusSnippet {
    let id = if !vendor.id.is_empty() {
        vendor.id.clone()
    } else if !vendor.name.is_empty() {
        vendor.name.clone()
    } else {
        format!("vendor-{}", index + 1)
    };
    let title = if vendor.name.is_empty() {
        "Vendor".to_string()
    } else {
        vendor.name.clone()
    };
    let description = if !vendor.deal.is_empty() {
        vendor.deal.clone()
    } else if !vendor.categories.is_empty() {
        vendor.categories.join(", ")
    } else {
        "Vendor services".to_string()
    };
    let location = if vendor.booth.is_empty() {
        "Expo Hall".to_string()
    } else {
        format!("Booth {}", vendor.booth)
    };

    CorpusSnippet::new(
        SnippetKind::Vendor,
        id,
        title.clone(),
        format!(
            "Vendor: {}. {}. {}",
            title,
            truncate_chars(&description, SNIPPET_DESCRIPTION_LIMIT),
            location
        ),
    )
}

fn announcement_snippet(item: &Announcement, index: usize) -> CorpusSnippet {
    let id = if !item.id.is_empty() {
        item.id.clone()
    } else if !item.title.is_empty() {
        item.title.clone()
    } else {
        format!("announcement-{}", index + 1)
    };
    let title = if item.title.is_empty() {
        "Announcement".to_string()
    } else {
        item.title.clone()
    };
    let body = if item.body.is_empty() {
        "Event update".to_string()
    } else {
        item.body.clone()
    };
    let date = if item.date.is_empty() {
        "Latest".to_string()
    } else {
        item.date.clone()
    };

    CorpusSnippet::new(
        SnippetKind::Announcement,
        id,
        title.clone(),
        format!(
            "Announcement: {}. {}. {}",
            title,
            truncate_chars(&body, SNIPPET_DESCRIPTION_LIMIT),
            date
        ),
    )
}

fn venue_snippet(conference: &ConferenceInfo, event_id: &str) -> CorpusSnippet {
    let id = if conference.id.is_empty() {
        event_id.to_string()
    } else {
        conference.id.clone()
    };
    let title = if conference.name.is_empty() {
        "Venue".to_string()
    } else {
        conference.name.clone()
    };
    let description = if !conference.description.is_empty() {
        conference.description.clone()
    } else if !conference.theme.is_empty() {
        conference.theme.clone()
    } else {
        "Event venue details".to_string()
    };
    let location: Vec<&str> = [
        conference.venue.as_str(),
        conference.city.as_str(),
        conference.date_range.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect();
    let location = if location.is_empty() {
        "Venue TBA".to_string()
    } else {
        location.join(" • ")
    };

    CorpusSnippet::new(
        SnippetKind::Venue,
        id,
        title.clone(),
        format!(
            "Venue: {}. {}. {}",
            title,
            truncate_chars(&description, SNIPPET_DESCRIPTION_LIMIT),
            location
        ),
    )
}

/// Flatten a catalog payload into the retrievable corpus.
///
/// Order is stable: sessions, vendors, announcements, then one venue
/// snippet. Cache identity depends on this order.
pub fn build_corpus(payload: &CatalogPayload, event_id: &str) -> Vec<CorpusSnippet> {
    let mut snippets = Vec::with_capacity(
        payload.sessions.len() + payload.vendors.len() + payload.announcements.len() + 1,
    );

    for (index, session) in payload.sessions.iter().enumerate() {
        snippets.push(session_snippet(session, index));
    }
    for (index, vendor) in payload.vendors.iter().enumerate() {
        snippets.push(vendor_snippet(vendor, index));
    }
    for (index, announcement) in payload.announcements.iter().enumerate() {
        snippets.push(announcement_snippet(announcement, index));
    }
    snippets.push(venue_snippet(&payload.conference, event_id));

    snippets
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_types::CorpusVersion;

    fn payload() -> CatalogPayload {
        CatalogPayload {
            sessions: vec![Session {
                id: "s1".to_string(),
                title: "Async Rust".to_string(),
                description: "Deep dive".to_string(),
                time: "9:00 AM - 10:00 AM".to_string(),
                room: "Hall A".to_string(),
                ..Session::default()
            }],
            vendors: vec![Vendor {
                id: "v1".to_string(),
                name: "Acme".to_string(),
                booth: "12".to_string(),
                ..Vendor::default()
            }],
            announcements: vec![Announcement {
                id: "a1".to_string(),
                title: "Doors open".to_string(),
                ..Announcement::default()
            }],
            conference: ConferenceInfo {
                id: "conf".to_string(),
                name: "RustConf".to_string(),
                city: "Portland".to_string(),
                ..ConferenceInfo::default()
            },
            version: CorpusVersion::new("v1"),
        }
    }

    #[test]
    fn test_build_session_text_joins_present_fields() {
        let session = Session {
            title: "Async Rust".to_string(),
            description: "Deep dive".to_string(),
            day: "Day 1".to_string(),
            tags: vec!["async".to_string(), "tokio".to_string()],
            ..Session::default()
        };

        let text = build_session_text(&session);
        assert_eq!(text, "Async Rust. Deep dive. Day 1. async, tokio");
    }

    #[test]
    fn test_corpus_order_is_stable() {
        let corpus = build_corpus(&payload(), "ev1");
        let kinds: Vec<SnippetKind> = corpus.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SnippetKind::Session,
                SnippetKind::Vendor,
                SnippetKind::Announcement,
                SnippetKind::Venue
            ]
        );
    }

    #[test]
    fn test_snippet_templates() {
        let corpus = build_corpus(&payload(), "ev1");

        assert!(corpus[0].text.starts_with("Session: Async Rust."));
        assert!(corpus[0].text.contains("9:00 AM - 10:00 AM • Hall A"));
        assert!(corpus[1].text.contains("Booth 12"));
        assert!(corpus[2].text.contains("Event update"));
        assert!(corpus[3].text.contains("RustConf"));
        assert!(corpus[3].text.contains("Portland"));
    }

    #[test]
    fn test_snippet_identity_includes_kind() {
        let corpus = build_corpus(&payload(), "ev1");
        assert_eq!(snippet_identity(&corpus[0]), "session:s1");
        assert_eq!(snippet_identity(&corpus[1]), "vendor:v1");
    }

    #[test]
    fn test_fallback_ids_and_titles() {
        let mut data = payload();
        data.sessions[0].id = String::new();
        data.sessions[0].title = String::new();
        data.sessions[0].description = String::new();

        let corpus = build_corpus(&data, "ev1");
        assert_eq!(corpus[0].source_id, "session-1");
        assert_eq!(corpus[0].title, "Session");
        assert!(corpus[0].text.contains("General session"));
    }

    #[test]
    fn test_long_description_truncated() {
        let mut data = payload();
        data.sessions[0].description = "x".repeat(500);

        let corpus = build_corpus(&data, "ev1");
        // "Session: Async Rust. " + 180 chars + ". " + time/room
        assert!(corpus[0].text.len() < 250);
    }
}
