use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::{cache, health, search};
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Builds the HTTP router
///
/// `/metrics` is mounted only when a Prometheus recorder was installed.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/search", post(search::search))
        .route("/api/search/stream", post(search::search_stream))
        .route("/api/cache", delete(cache::clear_cache))
        .route("/api/cache/stats", get(cache::cache_stats))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    let router = match metrics {
        Some(metrics) => api.merge(create_metrics_router(metrics)),
        None => api,
    };

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
