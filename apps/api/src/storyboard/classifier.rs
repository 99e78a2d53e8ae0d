//! Query Classifier: keyword triage from free text to a storyboard card.
//!
//! Algorithm (case-insensitive substring match, first group wins):
//! 1. tech / skill / language / framework      → tech-grid
//! 2. experience / work / career / history     → timeline
//! 3. project / portfolio / built              → list
//! 4. anything else                            → assistant message echoing the query
//!
//! Deterministic and offline. Card content comes from the injected `ProfileProvider`.

use tracing::debug;

use crate::storyboard::models::{FileHint, Payload, StoryboardItem};
use crate::storyboard::profile::ProfileProvider;

const TECH_KEYWORDS: &[&str] = &["tech", "skill", "language", "framework"];
const EXPERIENCE_KEYWORDS: &[&str] = &["experience", "work", "career", "history"];
const PROJECT_KEYWORDS: &[&str] = &["project", "portfolio", "built"];

/// The category a query was triaged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    TechStack,
    Experience,
    Projects,
    General,
}

/// Keyword groups in priority order. Earlier groups shadow later ones, so
/// "framework" lands in TechStack even though it contains "work".
const RULES: &[(Category, &[&str])] = &[
    (Category::TechStack, TECH_KEYWORDS),
    (Category::Experience, EXPERIENCE_KEYWORDS),
    (Category::Projects, PROJECT_KEYWORDS),
];

/// Returns the category of `query`. `General` when no keyword matches.
pub fn categorize(query: &str) -> Category {
    let lower = query.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

/// Text of the fallback message for an unmatched query.
pub fn fallback_text(query: &str, file_hint: Option<&FileHint>) -> String {
    let note = file_hint.map(FileHint::note).unwrap_or_default();
    format!(
        "I understand you're asking about \"{query}\". Let me help you explore this \
         candidate's background in that area. Feel free to ask more specific questions \
         about their technical skills, experience, or projects.{note}"
    )
}

pub struct QueryClassifier<P> {
    profile: P,
}

impl<P: ProfileProvider> QueryClassifier<P> {
    pub fn new(profile: P) -> Self {
        Self { profile }
    }

    /// Maps a query to a freshly stamped storyboard item.
    pub fn classify(&self, query: &str, file_hint: Option<&FileHint>) -> StoryboardItem {
        let category = categorize(query);
        debug!(?category, "Classified storyboard query");

        let payload = match category {
            Category::TechStack => Payload::TechGrid(self.profile.technologies()),
            Category::Experience => Payload::Timeline(self.profile.experience()),
            Category::Projects => Payload::List(self.profile.projects()),
            Category::General => {
                return StoryboardItem::assistant_message(fallback_text(query, file_hint));
            }
        };

        StoryboardItem::new(payload)
    }
}
