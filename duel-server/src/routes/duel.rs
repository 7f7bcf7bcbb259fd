//! Direct duel resolution

use axum::{extract::State, Json};
use std::sync::Arc;

use duel_core::CombatOutcome;
use duel_engine::ResolveRequest;

use crate::error::ApiResult;
use crate::state::ServerState;

/// Resolve one duel. The response carries the seed for replay.
pub async fn resolve_duel(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<Json<CombatOutcome>> {
    let outcome = state.engine.resolve(request).await?;
    Ok(Json(outcome))
}
