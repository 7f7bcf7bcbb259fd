//! Ratings and leaderboards

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use duel_engine::{LeaderboardEntry, WeeklyStanding};

use super::PageQuery;
use crate::error::ApiResult;
use crate::state::ServerState;

const DEFAULT_LIMIT: usize = 10;

#[derive(Serialize)]
pub struct RatingResponse {
    pub hero_id: String,
    pub rating: i32,
}

/// Always answers; unrated heroes and lookup failures report the default
pub async fn get_rating(
    State(state): State<Arc<ServerState>>,
    Path(hero_id): Path<String>,
) -> Json<RatingResponse> {
    let rating = state.engine.get_rating(&hero_id).await;
    Json(RatingResponse { hero_id, rating })
}

pub async fn leaderboard(
    State(state): State<Arc<ServerState>>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let rows = state.engine.leaderboard(page.limit_or(DEFAULT_LIMIT)).await?;
    Ok(Json(rows))
}

pub async fn weekly_leaderboard(
    State(state): State<Arc<ServerState>>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Vec<WeeklyStanding>>> {
    let rows = state
        .engine
        .weekly_leaderboard(page.limit_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(rows))
}
