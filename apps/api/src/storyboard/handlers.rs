//! Axum route handlers for the Storyboard API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::storyboard::models::{FileHint, Payload, StoryboardItem};
use crate::storyboard::pipeline::spawn_response;
use crate::storyboard::renderer::{render, render_all, DisplayWidget};
use crate::storyboard::session::{Role, SessionSnapshot};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub role: Role,
}

/// Where submitted text came from. Both origins take the same path.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOrigin {
    #[default]
    Typed,
    Voice,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQueryRequest {
    pub text: String,
    #[serde(default)]
    pub origin: QueryOrigin,
}

#[derive(Debug, Serialize)]
pub struct SubmitQueryResponse {
    pub ticket: Uuid,
    pub pending: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    pub created_at: Option<DateTime<Utc>>,
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let snapshot = state.sessions.create(request.role).await;
    info!(session_id = %snapshot.id, role = ?snapshot.role, "Session created");
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .with(id, |session| session.snapshot())
        .await
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}

/// DELETE /api/v1/sessions/:id
///
/// Discards the session and its log; a pending response is cancelled.
pub async fn handle_discard_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.discard(id).await {
        return Err(session_not_found(id));
    }
    info!(session_id = %id, "Session discarded");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/attachment
pub async fn handle_set_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(hint): Json<FileHint>,
) -> Result<Json<SessionSnapshot>, AppError> {
    if hint.file_name.trim().is_empty() {
        return Err(AppError::Validation("file_name cannot be empty".to_string()));
    }
    attach(&state, id, hint).await
}

/// POST /api/v1/sessions/:id/attachment/upload
///
/// Multipart intake. Only the first file's name and byte length are kept; the
/// file is counted chunk by chunk and never buffered.
pub async fn handle_upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionSnapshot>, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let mut size_bytes = 0u64;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            size_bytes += chunk.len() as u64;
        }

        return attach(&state, id, FileHint::new(file_name, size_bytes)).await;
    }

    Err(AppError::Validation(
        "multipart body contains no file".to_string(),
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the size limit: {}", e.body_text()))
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// DELETE /api/v1/sessions/:id/attachment
pub async fn handle_clear_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .with(id, |session| session.set_attachment(None))
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn attach(
    state: &AppState,
    id: Uuid,
    hint: FileHint,
) -> Result<Json<SessionSnapshot>, AppError> {
    info!(session_id = %id, file = %hint.file_name, size = %hint.size_label(), "Attachment set");
    state
        .sessions
        .with(id, |session| {
            session.set_attachment(Some(hint));
            session.snapshot()
        })
        .await
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}

/// POST /api/v1/sessions/:id/queries
///
/// Accepts typed or transcribed text. The user's message is appended now; the
/// response lands after the pacing delay. Blank text → 400, busy → 409.
pub async fn handle_submit_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitQueryRequest>,
) -> Result<(StatusCode, Json<SubmitQueryResponse>), AppError> {
    let submission = state
        .sessions
        .with(id, |session| session.begin(&request.text))
        .await
        .ok_or_else(|| session_not_found(id))??;

    info!(
        session_id = %id,
        ticket = %submission.ticket,
        origin = ?request.origin,
        backend = state.responder.backend(),
        "Query accepted"
    );

    let ticket = submission.ticket;
    spawn_response(
        state.sessions.clone(),
        id,
        submission,
        state.responder.clone(),
        state.pacing,
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitQueryResponse {
            ticket,
            pending: true,
        }),
    ))
}

/// GET /api/v1/sessions/:id/widgets
///
/// Every item in the log rendered in order, oldest first.
pub async fn handle_get_widgets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DisplayWidget>>, AppError> {
    state
        .sessions
        .with(id, |session| render_all(session.items()))
        .await
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}

/// POST /api/v1/render
///
/// Renders an item supplied by the host. The payload is validated against the
/// kind before rendering; reserved kinds render as the fallback widget.
pub async fn handle_render(
    Json(request): Json<RenderRequest>,
) -> Result<Json<DisplayWidget>, AppError> {
    let payload = Payload::from_parts(&request.kind, request.payload)?;
    let item = match request.created_at {
        Some(created_at) => StoryboardItem::at(payload, created_at),
        None => StoryboardItem::new(payload),
    };
    Ok(Json(render(&item)))
}
