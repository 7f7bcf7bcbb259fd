//! Match lifecycle endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use duel_engine::{Match, MatchResult};

use crate::error::{ApiError, ApiResult};
use crate::state::ServerState;

/// Completion report from the client. Out-of-range numbers are clamped by
/// the engine, not rejected.
#[derive(Debug, Deserialize)]
pub struct CompleteBody {
    pub winner_id: String,
    #[serde(default)]
    pub xp: i64,
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub duration_ms: i64,
}

pub async fn get_match(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.engine.get_match(id).await?))
}

pub async fn start_match(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.engine.start_match(id).await?))
}

pub async fn complete_match(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<CompleteBody>,
) -> ApiResult<Json<Match>> {
    if body.winner_id.trim().is_empty() {
        return Err(ApiError::BadRequest("winner_id is required".into()));
    }
    let result = MatchResult {
        winner_id: body.winner_id,
        xp: body.xp,
        gold: body.gold,
        duration_ms: body.duration_ms,
    };
    Ok(Json(state.engine.complete_match(id, result).await?))
}
