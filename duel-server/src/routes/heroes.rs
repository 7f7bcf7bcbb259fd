//! Per-hero views

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use duel_engine::{DuelEvent, Match};

use super::PageQuery;
use crate::error::ApiResult;
use crate::state::ServerState;

#[derive(Serialize)]
pub struct CurrentMatchResponse {
    pub hero_id: String,
    #[serde(rename = "match")]
    pub duel_match: Option<Match>,
}

pub async fn history(
    State(state): State<Arc<ServerState>>,
    Path(hero_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Vec<DuelEvent>>> {
    Ok(Json(state.engine.history(&hero_id, page.limit_or(20)).await?))
}

/// Lets a hero that was paired by someone else's enqueue find its match
pub async fn current_match(
    State(state): State<Arc<ServerState>>,
    Path(hero_id): Path<String>,
) -> ApiResult<Json<CurrentMatchResponse>> {
    let duel_match = state.engine.current_match(&hero_id).await?;
    Ok(Json(CurrentMatchResponse {
        hero_id,
        duel_match,
    }))
}
