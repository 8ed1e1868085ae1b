//! Health check endpoint

use std::time::Instant;

use axum::extract::State;
use serde::Serialize;

use super::state::AppState;
use super::types::Json;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub checks: Vec<HealthCheck>,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Status of one component
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /health`
///
/// Always answers 200: a broken persistent cache only degrades the service
/// to the memory tier.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let start = Instant::now();
    let checks = vec![check_cache_store(&state).await];

    let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
        latency_ms: start.elapsed().as_millis() as u64,
    })
}

async fn check_cache_store(state: &AppState) -> HealthCheck {
    match state.pipeline.cache().store().count().await {
        Ok(rows) => HealthCheck {
            name: "cache_store".to_string(),
            status: HealthStatus::Healthy,
            message: Some(format!("{} cached answers", rows)),
        },
        Err(e) => HealthCheck {
            name: "cache_store".to_string(),
            status: HealthStatus::Degraded,
            message: Some(e.to_string()),
        },
    }
}
