//! Blacklist queries.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use crate::models::{BlacklistEntry, BlacklistType};

/// Add a blacklist entry. The value is stored lowercased; a duplicate
/// (type, value) pair yields [`DbError::AlreadyExists`].
pub async fn create_blacklist_entry(pool: &SqlitePool, entry: &BlacklistEntry) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO blacklist (id, entry_type, value, source, reason, added_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(entry.entry_type)
    .bind(entry.value.to_lowercase())
    .bind(&entry.source)
    .bind(&entry.reason)
    .bind(&entry.added_by)
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .execute(pool)
    .await
    .map_err(|e| DbError::from_insert(e, "Blacklist entry", entry.value.clone()))?;
    Ok(())
}

/// Get an entry by ID.
pub async fn get_blacklist_entry(pool: &SqlitePool, id: &str) -> DbResult<Option<BlacklistEntry>> {
    let entry = sqlx::query_as::<_, BlacklistEntry>("SELECT * FROM blacklist WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

/// Look up a value of a given type.
pub async fn find_blacklisted(
    pool: &SqlitePool,
    entry_type: BlacklistType,
    value: &str,
) -> DbResult<Option<BlacklistEntry>> {
    let entry = sqlx::query_as::<_, BlacklistEntry>(
        "SELECT * FROM blacklist WHERE entry_type = ? AND value = ?",
    )
    .bind(entry_type)
    .bind(value.to_lowercase())
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

/// Look up a value regardless of type.
pub async fn find_blacklisted_any(
    pool: &SqlitePool,
    value: &str,
) -> DbResult<Option<BlacklistEntry>> {
    let entry = sqlx::query_as::<_, BlacklistEntry>("SELECT * FROM blacklist WHERE value = ? LIMIT 1")
        .bind(value.to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

/// List entries, newest first.
pub async fn list_blacklist(
    pool: &SqlitePool,
    entry_type: Option<BlacklistType>,
) -> DbResult<Vec<BlacklistEntry>> {
    let entries = sqlx::query_as::<_, BlacklistEntry>(
        "SELECT * FROM blacklist WHERE (? IS NULL OR entry_type = ?) ORDER BY created_at DESC",
    )
    .bind(entry_type)
    .bind(entry_type)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

/// Delete an entry.
pub async fn delete_blacklist_entry(pool: &SqlitePool, id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM blacklist WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
