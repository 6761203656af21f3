//! Health check handlers
//!
//! Endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use binge_service::dto::{HealthChecks, HealthResponse, ReadinessResponse};

use crate::state::AppState;

fn status(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

/// Basic health check (liveness probe)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness check with dependency health
///
/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match state.database() {
        Some(pool) => status(pool.acquire().await.is_ok()),
        None => "memory".to_string(),
    };

    let cooldown = match state.redis() {
        Some(redis) => status(redis.health_check().await.is_ok()),
        None => "local".to_string(),
    };

    let outbox_pending = state
        .service_context()
        .outbox_repo()
        .pending_count()
        .await
        .ok();

    let response = ReadinessResponse::from_checks(HealthChecks {
        database,
        cooldown,
        outbox_pending,
    });
    let code = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}
