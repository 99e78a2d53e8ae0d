//! Storyboard data model: items in a session log and their typed payloads.
//!
//! `kind` is never stored separately from the payload: it is the serde tag of
//! the `Payload` variant, so an item's shape always matches its kind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Kinds
// ────────────────────────────────────────────────────────────────────────────

/// Closed set of card kinds a storyboard item may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    TechGrid,
    Timeline,
    List,
    Chart,
    Image,
    UrlCard,
    Message,
}

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::TechGrid,
        ItemKind::Timeline,
        ItemKind::List,
        ItemKind::Chart,
        ItemKind::Image,
        ItemKind::UrlCard,
        ItemKind::Message,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::TechGrid => "tech-grid",
            ItemKind::Timeline => "timeline",
            ItemKind::List => "list",
            ItemKind::Chart => "chart",
            ItemKind::Image => "image",
            ItemKind::UrlCard => "url-card",
            ItemKind::Message => "message",
        }
    }

    pub fn parse(raw: &str) -> Option<ItemKind> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Payload shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub icon: String,
    pub level: String,
    pub years_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechGrid {
    pub title: String,
    pub technologies: Vec<Technology>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub title: String,
    pub org: String,
    pub period: String,
    pub description: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub title: String,
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectList {
    pub title: String,
    pub items: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(default)]
    pub is_user: bool,
}

/// Typed payload, adjacently tagged as `{"kind": ..., "payload": ...}`.
///
/// `chart`, `image` and `url-card` are reserved: nothing in this service
/// produces them, but hosts may hand them to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum Payload {
    TechGrid(TechGrid),
    Timeline(Timeline),
    List(ProjectList),
    Chart(Value),
    Image(Value),
    UrlCard(Value),
    Message(Message),
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("unknown storyboard kind '{0}'")]
    UnknownKind(String),

    #[error("payload does not match kind '{kind}': {source}")]
    ShapeMismatch {
        kind: ItemKind,
        #[source]
        source: serde_json::Error,
    },
}

impl Payload {
    pub fn kind(&self) -> ItemKind {
        match self {
            Payload::TechGrid(_) => ItemKind::TechGrid,
            Payload::Timeline(_) => ItemKind::Timeline,
            Payload::List(_) => ItemKind::List,
            Payload::Chart(_) => ItemKind::Chart,
            Payload::Image(_) => ItemKind::Image,
            Payload::UrlCard(_) => ItemKind::UrlCard,
            Payload::Message(_) => ItemKind::Message,
        }
    }

    /// Builds a payload from an untyped `(kind, payload)` pair, validating the
    /// payload's shape against the kind.
    pub fn from_parts(kind: &str, payload: Value) -> Result<Payload, PayloadError> {
        let item_kind =
            ItemKind::parse(kind).ok_or_else(|| PayloadError::UnknownKind(kind.to_string()))?;

        serde_json::from_value(json!({ "kind": kind, "payload": payload })).map_err(|source| {
            PayloadError::ShapeMismatch {
                kind: item_kind,
                source,
            }
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Item
// ────────────────────────────────────────────────────────────────────────────

/// A single card in a session's storyboard log. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryboardItem {
    id: Uuid,
    content: Payload,
    created_at: DateTime<Utc>,
}

impl StoryboardItem {
    /// Creates an item stamped now. Ids are UUIDv7, so they sort by creation
    /// time and never collide within a process.
    pub fn new(content: Payload) -> Self {
        Self::at(content, Utc::now())
    }

    pub fn at(content: Payload, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            content,
            created_at,
        }
    }

    pub fn user_message(text: impl Into<String>) -> Self {
        Self::new(Payload::Message(Message {
            text: text.into(),
            is_user: true,
        }))
    }

    pub fn assistant_message(text: impl Into<String>) -> Self {
        Self::new(Payload::Message(Message {
            text: text.into(),
            is_user: false,
        }))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// File metadata supplied by the intake collaborator. Only the name and size
/// are ever read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHint {
    pub file_name: String,
    pub size_bytes: u64,
}

impl FileHint {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
        }
    }

    /// Size in MiB with one decimal, labelled "MB" to match what users see.
    pub fn size_label(&self) -> String {
        format!("{:.1} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }

    /// Note appended to fallback messages when a file is attached.
    pub fn note(&self) -> String {
        format!(
            "\n\nNote: User has uploaded \"{}\" ({})",
            self.file_name,
            self.size_label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_kebab_case() {
        let item = StoryboardItem::assistant_message("hi");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["content"]["kind"], "message");
        assert_eq!(value["content"]["payload"]["text"], "hi");
        assert_eq!(value["content"]["payload"]["is_user"], false);

        let chart = Payload::UrlCard(json!({ "url": "https://example.com" }));
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["kind"], "url-card");
    }

    #[test]
    fn test_kind_parse_covers_every_variant() {
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ItemKind::parse("carousel"), None);
        assert_eq!(ItemKind::parse("Tech-Grid"), None);
    }

    #[test]
    fn test_from_parts_accepts_matching_shape() {
        let payload = Payload::from_parts(
            "list",
            json!({
                "title": "Key Projects",
                "items": [{
                    "name": "CLI",
                    "description": "A tool",
                    "tags": ["Rust"],
                    "impact": "1k users"
                }]
            }),
        )
        .unwrap();
        assert_eq!(payload.kind(), ItemKind::List);
    }

    #[test]
    fn test_from_parts_rejects_mismatched_shape() {
        let err = Payload::from_parts("timeline", json!({ "text": "hello" })).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::ShapeMismatch {
                kind: ItemKind::Timeline,
                ..
            }
        ));
    }

    #[test]
    fn test_from_parts_rejects_unknown_kind() {
        let err = Payload::from_parts("carousel", json!({})).unwrap_err();
        assert!(matches!(err, PayloadError::UnknownKind(k) if k == "carousel"));
    }

    #[test]
    fn test_reserved_kinds_accept_any_payload() {
        let payload = Payload::from_parts("chart", json!({ "series": [1, 2, 3] })).unwrap();
        assert_eq!(payload.kind(), ItemKind::Chart);
    }

    #[test]
    fn test_message_is_user_defaults_to_false() {
        let payload = Payload::from_parts("message", json!({ "text": "hey" })).unwrap();
        assert_eq!(
            payload,
            Payload::Message(Message {
                text: "hey".to_string(),
                is_user: false
            })
        );
    }

    #[test]
    fn test_item_ids_are_distinct_and_ordered() {
        let a = StoryboardItem::user_message("one");
        let b = StoryboardItem::user_message("two");
        assert_ne!(a.id(), b.id());
        assert!(a.id() < b.id());
    }

    #[test]
    fn test_file_hint_size_label_uses_mib() {
        let hint = FileHint::new("resume.pdf", 2_621_440);
        assert_eq!(hint.size_label(), "2.5 MB");
        assert_eq!(
            hint.note(),
            "\n\nNote: User has uploaded \"resume.pdf\" (2.5 MB)"
        );
    }

    #[test]
    fn test_file_hint_small_file_rounds_to_zero() {
        assert_eq!(FileHint::new("a.txt", 1024).size_label(), "0.0 MB");
    }
}
