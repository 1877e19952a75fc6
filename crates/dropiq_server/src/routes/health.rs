//! `GET /health`: liveness plus a database round trip.

use axum::extract::State;
use dropiq_api::{ApiResponse, HealthResponse};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let database = match state.db.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    ApiResponse::ok(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}
