//! Strategy, rating, comment and tip queries.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DbError, DbResult};
use crate::models::{
    Strategy, StrategyComment, StrategyFilter, StrategyRating, StrategySort, StrategyTip,
};

// ============================================================================
// Strategy CRUD
// ============================================================================

/// Create a strategy.
pub async fn create_strategy(pool: &SqlitePool, strategy: &Strategy) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO strategies (id, author_id, title, description, content, requirements,
                                airdrop_id, is_public, original_strategy_id, copy_count,
                                rating_sum, rating_count, tip_total_cents, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&strategy.id)
    .bind(&strategy.author_id)
    .bind(&strategy.title)
    .bind(&strategy.description)
    .bind(&strategy.content)
    .bind(&strategy.requirements)
    .bind(&strategy.airdrop_id)
    .bind(strategy.is_public)
    .bind(&strategy.original_strategy_id)
    .bind(strategy.copy_count)
    .bind(strategy.rating_sum)
    .bind(strategy.rating_count)
    .bind(strategy.tip_total_cents)
    .bind(strategy.created_at)
    .bind(strategy.updated_at)
    .execute(pool)
    .await
    .map_err(|e| DbError::from_insert(e, "Strategy", strategy.id.clone()))?;
    Ok(())
}

/// Get a strategy by ID.
pub async fn get_strategy(pool: &SqlitePool, id: &str) -> DbResult<Option<Strategy>> {
    let strategy = sqlx::query_as::<_, Strategy>("SELECT * FROM strategies WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(strategy)
}

/// List strategies visible to `filter.viewer_id` (public ones plus the
/// viewer's own).
pub async fn list_strategies(
    pool: &SqlitePool,
    filter: &StrategyFilter,
) -> DbResult<Vec<Strategy>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM strategies WHERE (is_public = 1");
    if let Some(viewer) = &filter.viewer_id {
        qb.push(" OR author_id = ").push_bind(viewer.clone());
    }
    qb.push(")");
    if let Some(airdrop_id) = &filter.airdrop_id {
        qb.push(" AND airdrop_id = ").push_bind(airdrop_id.clone());
    }
    if let Some(author_id) = &filter.author_id {
        qb.push(" AND author_id = ").push_bind(author_id.clone());
    }
    qb.push(match filter.sort {
        StrategySort::Rating => {
            " ORDER BY CASE WHEN rating_count = 0 THEN 0.0 \
             ELSE CAST(rating_sum AS REAL) / rating_count END DESC, rating_count DESC, created_at DESC"
        }
        StrategySort::Recent => " ORDER BY created_at DESC",
        StrategySort::Popular => " ORDER BY copy_count DESC, tip_total_cents DESC, created_at DESC",
    });
    qb.push(" LIMIT ").push_bind(filter.limit.max(1));
    qb.push(" OFFSET ").push_bind(filter.offset.max(0));

    let strategies = qb.build_query_as::<Strategy>().fetch_all(pool).await?;
    Ok(strategies)
}

/// Update the editable fields of a strategy.
pub async fn update_strategy(pool: &SqlitePool, strategy: &Strategy) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE strategies
        SET title = ?, description = ?, content = ?, requirements = ?, airdrop_id = ?,
            is_public = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&strategy.title)
    .bind(&strategy.description)
    .bind(&strategy.content)
    .bind(&strategy.requirements)
    .bind(&strategy.airdrop_id)
    .bind(strategy.is_public)
    .bind(Utc::now())
    .bind(&strategy.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a strategy (ratings, comments and tips cascade).
pub async fn delete_strategy(pool: &SqlitePool, id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM strategies WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Bump the copy counter of a source strategy.
pub async fn increment_copy_count(pool: &SqlitePool, id: &str) -> DbResult<bool> {
    let result =
        sqlx::query("UPDATE strategies SET copy_count = copy_count + 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Ratings
// ============================================================================

/// Insert or replace a user's rating, then refresh the strategy aggregates.
pub async fn upsert_rating(pool: &SqlitePool, rating: &StrategyRating) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO strategy_ratings (strategy_id, user_id, rating, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(strategy_id, user_id)
        DO UPDATE SET rating = excluded.rating, updated_at = excluded.updated_at
        "#,
    )
    .bind(&rating.strategy_id)
    .bind(&rating.user_id)
    .bind(rating.rating)
    .bind(rating.created_at)
    .bind(rating.updated_at)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        UPDATE strategies
        SET rating_sum = (SELECT COALESCE(SUM(rating), 0) FROM strategy_ratings WHERE strategy_id = ?),
            rating_count = (SELECT COUNT(*) FROM strategy_ratings WHERE strategy_id = ?)
        WHERE id = ?
        "#,
    )
    .bind(&rating.strategy_id)
    .bind(&rating.strategy_id)
    .bind(&rating.strategy_id)
    .execute(pool)
    .await?;
    Ok(())
}

// ============================================================================
// Comments
// ============================================================================

/// Add a comment.
pub async fn create_comment(pool: &SqlitePool, comment: &StrategyComment) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO strategy_comments (id, strategy_id, author_id, body, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&comment.id)
    .bind(&comment.strategy_id)
    .bind(&comment.author_id)
    .bind(&comment.body)
    .bind(comment.created_at)
    .bind(comment.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// List comments on a strategy, oldest first.
pub async fn list_comments(pool: &SqlitePool, strategy_id: &str) -> DbResult<Vec<StrategyComment>> {
    let comments = sqlx::query_as::<_, StrategyComment>(
        "SELECT * FROM strategy_comments WHERE strategy_id = ? ORDER BY created_at ASC",
    )
    .bind(strategy_id)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}

// ============================================================================
// Tips
// ============================================================================

/// Record a tip and add it to the strategy's running total.
pub async fn create_tip(pool: &SqlitePool, tip: &StrategyTip) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO strategy_tips (id, strategy_id, from_user_id, amount_cents, currency,
                                   tx_hash, message, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&tip.id)
    .bind(&tip.strategy_id)
    .bind(&tip.from_user_id)
    .bind(tip.amount_cents)
    .bind(&tip.currency)
    .bind(&tip.tx_hash)
    .bind(&tip.message)
    .bind(tip.created_at)
    .execute(pool)
    .await?;

    sqlx::query("UPDATE strategies SET tip_total_cents = tip_total_cents + ? WHERE id = ?")
        .bind(tip.amount_cents)
        .bind(&tip.strategy_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// List tips for a strategy, newest first.
pub async fn list_tips(pool: &SqlitePool, strategy_id: &str) -> DbResult<Vec<StrategyTip>> {
    let tips = sqlx::query_as::<_, StrategyTip>(
        "SELECT * FROM strategy_tips WHERE strategy_id = ? ORDER BY created_at DESC",
    )
    .bind(strategy_id)
    .fetch_all(pool)
    .await?;
    Ok(tips)
}
