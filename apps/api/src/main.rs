mod config;
mod errors;
mod llm_client;
mod routes;
mod state;
mod storyboard;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ResponderBackend};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storyboard::pipeline::Pacing;
use crate::storyboard::profile::StaticProfile;
use crate::storyboard::responder::{KeywordResponder, LlmResponder, Responder};
use crate::storyboard::session::{spawn_idle_sweep, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed or missing values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Companion API v{}", env!("CARGO_PKG_VERSION"));

    let responder = build_responder(&config)?;
    info!("Responder initialized (backend: {})", responder.backend());

    let pacing = Pacing {
        delay: config.response_delay,
        timeout: config.response_timeout,
    };
    info!(
        "Response pacing: delay={}ms timeout={}s",
        pacing.delay.as_millis(),
        pacing.timeout.as_secs()
    );

    let state = AppState {
        sessions: SessionStore::new(),
        responder,
        pacing,
        max_upload_bytes: config.max_upload_bytes,
    };

    spawn_idle_sweep(state.sessions.clone(), config.session_idle_ttl);
    info!(
        "Idle sessions expire after {}s",
        config.session_idle_ttl.as_secs()
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the responder backend named by `RESPONDER`.
fn build_responder(config: &Config) -> Result<Arc<dyn Responder>> {
    match config.responder {
        ResponderBackend::Keyword => Ok(Arc::new(KeywordResponder::new(StaticProfile))),
        ResponderBackend::Llm => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .context("ANTHROPIC_API_KEY is required for the llm responder")?;
            let llm = LlmClient::new(api_key, config.response_timeout)
                .context("Failed to build LLM HTTP client")?;
            info!("LLM client initialized (model: {})", config.llm_model);
            Ok(Arc::new(LlmResponder::new(llm, config.llm_model.clone())))
        }
    }
}
