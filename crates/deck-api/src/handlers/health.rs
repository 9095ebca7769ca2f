//! Health check handlers
//!
//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use deck_service::dto::{HealthResponse, ReadinessResponse};
use tracing::warn;

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness: the credential store must answer a ping
///
/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store_healthy = match state.service_context().account_repo().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Store ping failed");
            false
        }
    };

    let response = ReadinessResponse::ready(store_healthy);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
