//! Duel Server - HTTP API for the duel arena
//!
//! This crate provides the web backend:
//! - Direct duel resolution
//! - Matchmaking queue and match lifecycle
//! - Ratings, leaderboards and duel history

mod error;
mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use duel_engine::{DuelEngine, EngineConfig};

pub use error::ApiError;
pub use state::ServerState;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8003,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address {}: {}", raw, e))
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Status
        .route("/api/status", get(routes::status::status_handler))
        // Direct resolution
        .route("/api/duel/resolve", post(routes::duel::resolve_duel))
        // Matchmaking
        .route("/api/matchmaking/enqueue", post(routes::matchmaking::enqueue))
        .route("/api/matchmaking/leave", post(routes::matchmaking::leave))
        // Match lifecycle
        .route("/api/matches/:id", get(routes::matches::get_match))
        .route("/api/matches/:id/start", post(routes::matches::start_match))
        .route(
            "/api/matches/:id/complete",
            post(routes::matches::complete_match),
        )
        // Ratings
        .route("/api/ratings/:hero_id", get(routes::ratings::get_rating))
        .route("/api/leaderboard", get(routes::ratings::leaderboard))
        .route(
            "/api/leaderboard/weekly",
            get(routes::ratings::weekly_leaderboard),
        )
        // Per-hero views
        .route(
            "/api/heroes/:hero_id/history",
            get(routes::heroes::history),
        )
        .route(
            "/api/heroes/:hero_id/match",
            get(routes::heroes::current_match),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server over an in-memory store
pub async fn run_server(config: ServerConfig, engine_config: EngineConfig) -> anyhow::Result<()> {
    let addr = config.addr()?;
    let state = Arc::new(ServerState::new(DuelEngine::in_memory(engine_config)));
    let router = create_router(state);

    tracing::info!("Duel server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;
    axum::serve(listener, router).await?;

    Ok(())
}
