//! Status endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::ServerState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    /// None when the queue store is unreachable
    pub queue_size: Option<usize>,
}

pub async fn status_handler(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    let queue_size = match state.engine.queue_size().await {
        Ok(size) => Some(size),
        Err(e) => {
            tracing::warn!(error = %e, "queue size unavailable");
            None
        }
    };

    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        queue_size,
    })
}
