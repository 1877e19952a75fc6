//! Audit event queries.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::AuditEvent;

/// Append an audit event.
pub async fn record_audit_event(pool: &SqlitePool, event: &AuditEvent) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_events (id, actor_id, action, target_type, target_id, detail, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(&event.actor_id)
    .bind(&event.action)
    .bind(&event.target_type)
    .bind(&event.target_id)
    .bind(&event.detail)
    .bind(event.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Most recent audit events.
pub async fn list_audit_events(pool: &SqlitePool, limit: i64) -> DbResult<Vec<AuditEvent>> {
    let events = sqlx::query_as::<_, AuditEvent>(
        "SELECT * FROM audit_events ORDER BY created_at DESC LIMIT ?",
    )
    .bind(limit.clamp(1, 500))
    .fetch_all(pool)
    .await?;
    Ok(events)
}
