//! HTTP gateway for UIGen.
//!
//! Exposes the chat endpoint that streams wire frames, a project lookup
//! endpoint backed by the configured store, and a health check.
//!
//! Built on Axum.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, header};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use uigen_agent::{AgentLoop, SessionDeps};
use uigen_config::AppConfig;
use uigen_core::provider::Provider;
use uigen_providers::AnthropicProvider;

/// Shared application state for the gateway.
pub struct AppState {
    pub session: SessionDeps,
    pub body_limit: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire the provider, agent and store described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let provider: Arc<dyn Provider> = Arc::new(AnthropicProvider::from_config(config)?);
        let agent = Arc::new(AgentLoop::from_config(provider, config));
        let store = uigen_store::from_config(&config.store);
        info!(
            model = %config.model,
            store = store.name(),
            max_iterations = agent.max_iterations(),
            "Gateway state ready"
        );
        Ok(Self {
            session: SessionDeps { agent, store },
            body_limit: config.gateway.body_limit_bytes,
        })
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    let body_limit = state.body_limit;
    Router::new()
        .route("/health", get(api::health_handler))
        .route("/api/chat", post(api::chat_handler))
        .route("/api/projects/{id}", get(api::get_project_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr();
    let state = Arc::new(AppState::from_config(&config)?);
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
