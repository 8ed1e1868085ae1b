//! Cache administration endpoints

use axum::extract::State;
use tracing::info;

use super::state::AppState;
use super::types::Json;
use crate::infrastructure::cache::{CacheStats, ClearOutcome};

/// `DELETE /api/cache`: empties both cache tiers
pub async fn clear_cache(State(state): State<AppState>) -> Json<ClearOutcome> {
    let outcome = state.pipeline.cache().clear().await;
    info!(outcome = ?outcome, "Cache cleared via API");
    Json(outcome)
}

/// `GET /api/cache/stats`
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.pipeline.cache().stats())
}
