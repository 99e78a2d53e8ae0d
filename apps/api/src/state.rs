use std::sync::Arc;

use crate::storyboard::pipeline::Pacing;
use crate::storyboard::responder::Responder;
use crate::storyboard::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Pluggable responder. Default: KeywordResponder. Swap via RESPONDER env.
    pub responder: Arc<dyn Responder>,
    /// Delay and timeout applied to every deferred response.
    pub pacing: Pacing,
    /// Request body cap for multipart uploads.
    pub max_upload_bytes: usize,
}
