//! Responders: pluggable, trait-based backends that turn a submission into
//! the storyboard item that answers it.
//!
//! Default: `KeywordResponder` (offline, deterministic, wraps the classifier).
//! Alternative: `LlmResponder` (hosted text generation via `llm_client`).
//!
//! `AppState` holds an `Arc<dyn Responder>`, chosen at startup via config.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::prompts::storyboard_system;
use crate::llm_client::{GenerationRequest, LlmClient};
use crate::storyboard::classifier::QueryClassifier;
use crate::storyboard::models::{FileHint, StoryboardItem};
use crate::storyboard::profile::ProfileProvider;
use crate::storyboard::session::Role;

/// Everything a responder may look at for one submission.
#[derive(Debug, Clone)]
pub struct ResponseRequest {
    pub query: String,
    pub file_hint: Option<FileHint>,
    pub role: Role,
}

/// Implement this to swap backends without touching the session pipeline or
/// handlers.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, request: &ResponseRequest) -> Result<StoryboardItem, AppError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordResponder: default
// ────────────────────────────────────────────────────────────────────────────

pub struct KeywordResponder<P> {
    classifier: QueryClassifier<P>,
}

impl<P: ProfileProvider> KeywordResponder<P> {
    pub fn new(profile: P) -> Self {
        Self {
            classifier: QueryClassifier::new(profile),
        }
    }
}

#[async_trait]
impl<P: ProfileProvider> Responder for KeywordResponder<P> {
    async fn respond(&self, request: &ResponseRequest) -> Result<StoryboardItem, AppError> {
        Ok(self
            .classifier
            .classify(&request.query, request.file_hint.as_ref()))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmResponder: hosted text generation
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResponder {
    llm: LlmClient,
    model: String,
}

impl LlmResponder {
    pub fn new(llm: LlmClient, model: String) -> Self {
        Self { llm, model }
    }
}

/// Builds the generation request. The file note travels inside the prompt so
/// the model sees the same context the classifier would.
pub fn generation_request(request: &ResponseRequest, model: &str) -> GenerationRequest {
    let note = request
        .file_hint
        .as_ref()
        .map(FileHint::note)
        .unwrap_or_default();

    GenerationRequest {
        prompt: format!("{}{note}", request.query),
        system: storyboard_system(request.role),
        model: model.to_string(),
    }
}

#[async_trait]
impl Responder for LlmResponder {
    async fn respond(&self, request: &ResponseRequest) -> Result<StoryboardItem, AppError> {
        let response = self
            .llm
            .generate(&generation_request(request, &self.model))
            .await
            .map_err(|e| AppError::Llm(format!("Storyboard generation failed: {e}")))?;

        Ok(StoryboardItem::assistant_message(response.text))
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storyboard::models::{ItemKind, Payload};
    use crate::storyboard::profile::StaticProfile;

    fn request(query: &str, file_hint: Option<FileHint>) -> ResponseRequest {
        ResponseRequest {
            query: query.to_string(),
            file_hint,
            role: Role::Recruiter,
        }
    }

    #[tokio::test]
    async fn test_keyword_responder_delegates_to_classifier() {
        let responder = KeywordResponder::new(StaticProfile);
        let item = responder
            .respond(&request("What's your tech stack?", None))
            .await
            .unwrap();
        assert_eq!(item.kind(), ItemKind::TechGrid);
        assert_eq!(responder.backend(), "keyword");
    }

    #[tokio::test]
    async fn test_keyword_responder_passes_file_hint() {
        let responder = KeywordResponder::new(StaticProfile);
        let item = responder
            .respond(&request("hi", Some(FileHint::new("cv.pdf", 2_621_440))))
            .await
            .unwrap();
        let Payload::Message(message) = item.payload() else {
            panic!("expected message");
        };
        assert!(message.text.contains("\"cv.pdf\" (2.5 MB)"));
    }

    #[test]
    fn test_generation_request_carries_note_and_model() {
        let req = generation_request(
            &request("Tell me about Rust", Some(FileHint::new("cv.pdf", 1_048_576))),
            "claude-test",
        );
        assert_eq!(req.model, "claude-test");
        assert!(req.prompt.starts_with("Tell me about Rust"));
        assert!(req.prompt.ends_with("(1.0 MB)"));
        assert!(req.system.contains("recruiter"));
    }
}
