//! Audit trail writes.

use chrono::Utc;
use dropiq_db::{queries, AuditEvent, SqlitePool, User};
use tracing::warn;
use uuid::Uuid;

use super::{page_limit, require_admin};
use crate::error::CoreResult;

/// Record an administrative action. Failures are logged, never propagated.
pub async fn record(
    pool: &SqlitePool,
    actor_id: Option<&str>,
    action: &str,
    target_type: &str,
    target_id: Option<&str>,
    detail: Option<String>,
) {
    let event = AuditEvent {
        id: Uuid::new_v4().to_string(),
        actor_id: actor_id.map(str::to_string),
        action: action.to_string(),
        target_type: target_type.to_string(),
        target_id: target_id.map(str::to_string),
        detail,
        created_at: Utc::now(),
    };
    if let Err(e) = queries::record_audit_event(pool, &event).await {
        warn!(action, error = %e, "Failed to record audit event");
    }
}

/// Most recent audit events, newest first.
pub async fn recent(pool: &SqlitePool, admin: &User, limit: Option<i64>) -> CoreResult<Vec<AuditEvent>> {
    require_admin(admin)?;
    Ok(queries::list_audit_events(pool, page_limit(limit)).await?)
}
