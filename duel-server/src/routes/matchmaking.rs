//! Matchmaking queue endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use duel_engine::EnqueueOutcome;

use crate::error::ApiResult;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct EnqueueBody {
    pub hero_id: String,
    pub hero_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaveBody {
    pub hero_id: String,
}

#[derive(Serialize)]
pub struct LeaveResponse {
    pub hero_id: String,
    pub left: bool,
}

pub async fn enqueue(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<EnqueueBody>,
) -> ApiResult<Json<EnqueueOutcome>> {
    let outcome = state.engine.enqueue(&body.hero_id, &body.hero_name).await?;
    Ok(Json(outcome))
}

pub async fn leave(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<LeaveBody>,
) -> ApiResult<Json<LeaveResponse>> {
    let left = state.engine.leave_queue(&body.hero_id).await?;
    Ok(Json(LeaveResponse {
        hero_id: body.hero_id,
        left,
    }))
}
