//! Automated task queries.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::{ApprovalStatus, AutomatedTask, TaskStatus};

/// Create a task.
pub async fn create_task(pool: &SqlitePool, task: &AutomatedTask) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO automated_tasks (id, user_id, airdrop_id, task_type, execution_mode,
                                     approval_status, status, payload, result, scheduled_at,
                                     created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&task.id)
    .bind(&task.user_id)
    .bind(&task.airdrop_id)
    .bind(task.task_type)
    .bind(task.execution_mode)
    .bind(task.approval_status)
    .bind(task.status)
    .bind(&task.payload)
    .bind(&task.result)
    .bind(task.scheduled_at)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Get a task by ID.
pub async fn get_task(pool: &SqlitePool, id: &str) -> DbResult<Option<AutomatedTask>> {
    let task = sqlx::query_as::<_, AutomatedTask>("SELECT * FROM automated_tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(task)
}

/// List a user's tasks, soonest scheduled first.
pub async fn list_tasks(
    pool: &SqlitePool,
    user_id: &str,
    status: Option<TaskStatus>,
) -> DbResult<Vec<AutomatedTask>> {
    let tasks = sqlx::query_as::<_, AutomatedTask>(
        r#"
        SELECT * FROM automated_tasks
        WHERE user_id = ? AND (? IS NULL OR status = ?)
        ORDER BY scheduled_at IS NULL, scheduled_at ASC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(status)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(tasks)
}

/// Set the approval state of a task.
pub async fn set_task_approval(
    pool: &SqlitePool,
    id: &str,
    approval_status: ApprovalStatus,
) -> DbResult<bool> {
    let result =
        sqlx::query("UPDATE automated_tasks SET approval_status = ?, updated_at = ? WHERE id = ?")
            .bind(approval_status)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Set the execution state (and optional result) of a task.
pub async fn set_task_status(
    pool: &SqlitePool,
    id: &str,
    status: TaskStatus,
    result: Option<&str>,
) -> DbResult<bool> {
    let outcome = sqlx::query(
        "UPDATE automated_tasks SET status = ?, result = COALESCE(?, result), updated_at = ? WHERE id = ?",
    )
    .bind(status)
    .bind(result)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(outcome.rows_affected() > 0)
}

/// Delete a task.
pub async fn delete_task(pool: &SqlitePool, id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM automated_tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
