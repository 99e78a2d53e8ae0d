//! Card Renderer: pure projection from a storyboard item to a display widget.
//!
//! The match over `Payload` is exhaustive; reserved kinds fall through to the
//! `Unsupported` widget instead of failing.

use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

use crate::storyboard::models::{Payload, StoryboardItem};

const ASSISTANT_MARKER: &str = "Assistant";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechBadge {
    pub icon: String,
    pub name: String,
    pub level: String,
    pub years: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub title: String,
    pub org: String,
    pub period: String,
    pub description: String,
    pub achievements: Vec<String>,
    /// Draw a connecting line down to the next row.
    pub connector: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRow {
    pub name: String,
    pub description: String,
    pub impact: String,
    pub chips: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Outgoing,
    Incoming,
}

/// Display-ready widget handed to the rendering host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum DisplayWidget {
    TechGrid {
        item_id: Uuid,
        title: String,
        badges: Vec<TechBadge>,
    },
    Timeline {
        item_id: Uuid,
        title: String,
        rows: Vec<TimelineRow>,
    },
    ProjectList {
        item_id: Uuid,
        title: String,
        rows: Vec<ProjectRow>,
    },
    Bubble {
        item_id: Uuid,
        alignment: Alignment,
        marker: Option<String>,
        text: String,
        time_label: String,
    },
    Unsupported {
        item_id: Uuid,
        kind: String,
        notice: String,
    },
}

pub fn render(item: &StoryboardItem) -> DisplayWidget {
    let item_id = item.id();

    match item.payload() {
        Payload::TechGrid(grid) => DisplayWidget::TechGrid {
            item_id,
            title: grid.title.clone(),
            badges: grid
                .technologies
                .iter()
                .map(|t| TechBadge {
                    icon: t.icon.clone(),
                    name: t.name.clone(),
                    level: t.level.clone(),
                    years: t.years_label.clone(),
                })
                .collect(),
        },
        Payload::Timeline(timeline) => {
            let last = timeline.events.len().saturating_sub(1);
            DisplayWidget::Timeline {
                item_id,
                title: timeline.title.clone(),
                rows: timeline
                    .events
                    .iter()
                    .enumerate()
                    .map(|(i, e)| TimelineRow {
                        title: e.title.clone(),
                        org: e.org.clone(),
                        period: e.period.clone(),
                        description: e.description.clone(),
                        achievements: e.achievements.clone(),
                        connector: i < last,
                    })
                    .collect(),
            }
        }
        Payload::List(list) => DisplayWidget::ProjectList {
            item_id,
            title: list.title.clone(),
            rows: list
                .items
                .iter()
                .map(|p| ProjectRow {
                    name: p.name.clone(),
                    description: p.description.clone(),
                    impact: p.impact.clone(),
                    chips: p.tags.clone(),
                })
                .collect(),
        },
        Payload::Message(message) => DisplayWidget::Bubble {
            item_id,
            alignment: if message.is_user {
                Alignment::Outgoing
            } else {
                Alignment::Incoming
            },
            marker: (!message.is_user).then(|| ASSISTANT_MARKER.to_string()),
            text: message.text.clone(),
            time_label: time_label(item),
        },
        Payload::Chart(_) | Payload::Image(_) | Payload::UrlCard(_) => {
            let kind = item.kind().as_str();
            DisplayWidget::Unsupported {
                item_id,
                kind: kind.to_string(),
                notice: format!("Unsupported content type: {kind}"),
            }
        }
    }
}

/// Renders a whole log, oldest first.
pub fn render_all(items: &[StoryboardItem]) -> Vec<DisplayWidget> {
    items.iter().map(render).collect()
}

/// Local wall-clock `HH:MM` of the item's creation.
fn time_label(item: &StoryboardItem) -> String {
    item.created_at()
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string()
}
