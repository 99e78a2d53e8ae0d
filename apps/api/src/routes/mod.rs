pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::storyboard::handlers;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_discard_session),
        )
        .route(
            "/api/v1/sessions/:id/attachment",
            put(handlers::handle_set_attachment).delete(handlers::handle_clear_attachment),
        )
        .route(
            "/api/v1/sessions/:id/attachment/upload",
            post(handlers::handle_upload_attachment).layer(upload_limit),
        )
        // Storyboard
        .route(
            "/api/v1/sessions/:id/queries",
            post(handlers::handle_submit_query),
        )
        .route(
            "/api/v1/sessions/:id/widgets",
            get(handlers::handle_get_widgets),
        )
        .route("/api/v1/render", post(handlers::handle_render))
        .with_state(state)
}
