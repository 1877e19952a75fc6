//! Operator endpoints: alert broadcast, counts and the audit trail.

use axum::extract::State;
use dropiq_api::{AuditQuery, BroadcastAlertRequest, DbStats, DeliveredResponse};
use dropiq_core::services::{audit, SecurityAlert};
use dropiq_db::AuditEvent;
use tracing::info;

use super::{ok, ApiResult};
use crate::error::AppError;
use crate::extract::{AdminUser, ApiJson, ApiQuery};
use crate::state::AppState;

/// `POST /api/admin/alerts`. Delivery is best effort; `delivered` counts live subscribers.
pub async fn broadcast_alert(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<BroadcastAlertRequest>,
) -> ApiResult<DeliveredResponse> {
    let title = req.title.trim();
    let message = req.message.trim();
    if title.is_empty() || message.is_empty() {
        return Err(AppError::bad_request("title and message must not be empty"));
    }

    let delivered = state
        .alerts
        .publish(SecurityAlert::new(title, message, req.severity));
    info!(admin_id = %admin.id, delivered, "Security alert broadcast");
    audit::record(
        state.db.pool(),
        Some(&admin.id),
        "alert.broadcast",
        "alert",
        None,
        Some(title.to_string()),
    )
    .await;
    ok(DeliveredResponse { delivered })
}

pub async fn stats(State(state): State<AppState>, _: AdminUser) -> ApiResult<DbStats> {
    let stats = state.db.stats().await.map_err(dropiq_core::CoreError::from)?;
    ok(stats)
}

pub async fn audit_log(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiQuery(query): ApiQuery<AuditQuery>,
) -> ApiResult<Vec<AuditEvent>> {
    ok(audit::recent(state.db.pool(), &admin, query.limit).await?)
}
