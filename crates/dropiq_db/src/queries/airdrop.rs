//! Airdrop queries.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DbError, DbResult};
use crate::models::{Airdrop, AirdropFilter, AirdropStatus};

/// Create an airdrop. A duplicate slug or case-insensitive name yields
/// [`DbError::AlreadyExists`].
pub async fn create_airdrop(pool: &SqlitePool, airdrop: &Airdrop) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO airdrops (id, name, slug, description, project_url, contract_address,
                              chain_id, category, status, requirements, estimated_value_usd,
                              deadline, submitted_by, rejection_reason, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&airdrop.id)
    .bind(&airdrop.name)
    .bind(&airdrop.slug)
    .bind(&airdrop.description)
    .bind(&airdrop.project_url)
    .bind(&airdrop.contract_address)
    .bind(airdrop.chain_id)
    .bind(&airdrop.category)
    .bind(airdrop.status)
    .bind(&airdrop.requirements)
    .bind(airdrop.estimated_value_usd)
    .bind(airdrop.deadline)
    .bind(&airdrop.submitted_by)
    .bind(&airdrop.rejection_reason)
    .bind(airdrop.created_at)
    .bind(airdrop.updated_at)
    .execute(pool)
    .await
    .map_err(|e| DbError::from_insert(e, "Airdrop", airdrop.slug.clone()))?;
    Ok(())
}

/// Get an airdrop by ID.
pub async fn get_airdrop(pool: &SqlitePool, id: &str) -> DbResult<Option<Airdrop>> {
    let airdrop = sqlx::query_as::<_, Airdrop>("SELECT * FROM airdrops WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(airdrop)
}

/// Get an airdrop by slug.
pub async fn get_airdrop_by_slug(pool: &SqlitePool, slug: &str) -> DbResult<Option<Airdrop>> {
    let airdrop = sqlx::query_as::<_, Airdrop>("SELECT * FROM airdrops WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(airdrop)
}

/// Find an existing airdrop that clashes with the given slug or
/// (case-insensitive) name, optionally ignoring one airdrop.
pub async fn find_airdrop_conflict(
    pool: &SqlitePool,
    slug: &str,
    name: &str,
    exclude_id: Option<&str>,
) -> DbResult<Option<Airdrop>> {
    let airdrop = sqlx::query_as::<_, Airdrop>(
        r#"
        SELECT * FROM airdrops
        WHERE (slug = ? OR name = ? COLLATE NOCASE)
          AND (? IS NULL OR id != ?)
        LIMIT 1
        "#,
    )
    .bind(slug)
    .bind(name)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;
    Ok(airdrop)
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a AirdropFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(chain_id) = filter.chain_id {
        qb.push(" AND chain_id = ").push_bind(chain_id);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim().to_lowercase());
        qb.push(" AND (lower(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR slug LIKE ")
            .push_bind(pattern.clone())
            .push(" OR lower(coalesce(description, '')) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// List airdrops matching a filter, soonest deadline first then newest.
pub async fn list_airdrops(pool: &SqlitePool, filter: &AirdropFilter) -> DbResult<Vec<Airdrop>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM airdrops WHERE 1 = 1");
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY deadline IS NULL, deadline ASC, created_at DESC");
    qb.push(" LIMIT ").push_bind(filter.limit.max(1));
    qb.push(" OFFSET ").push_bind(filter.offset.max(0));

    let airdrops = qb.build_query_as::<Airdrop>().fetch_all(pool).await?;
    Ok(airdrops)
}

/// Count airdrops matching a filter (ignores limit/offset).
pub async fn count_airdrops(pool: &SqlitePool, filter: &AirdropFilter) -> DbResult<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM airdrops WHERE 1 = 1");
    push_filter(&mut qb, filter);
    let (count,): (i64,) = qb.build_query_as().fetch_one(pool).await?;
    Ok(count)
}

/// Update the editable fields of an airdrop.
pub async fn update_airdrop(pool: &SqlitePool, airdrop: &Airdrop) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE airdrops
        SET name = ?, slug = ?, description = ?, project_url = ?, contract_address = ?,
            chain_id = ?, category = ?, requirements = ?, estimated_value_usd = ?,
            deadline = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&airdrop.name)
    .bind(&airdrop.slug)
    .bind(&airdrop.description)
    .bind(&airdrop.project_url)
    .bind(&airdrop.contract_address)
    .bind(airdrop.chain_id)
    .bind(&airdrop.category)
    .bind(&airdrop.requirements)
    .bind(airdrop.estimated_value_usd)
    .bind(airdrop.deadline)
    .bind(Utc::now())
    .bind(&airdrop.id)
    .execute(pool)
    .await
    .map_err(|e| DbError::from_insert(e, "Airdrop", airdrop.slug.clone()))?;
    Ok(result.rows_affected() > 0)
}

/// Set the moderation status of an airdrop.
pub async fn set_airdrop_status(
    pool: &SqlitePool,
    id: &str,
    status: AirdropStatus,
    rejection_reason: Option<&str>,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE airdrops SET status = ?, rejection_reason = ?, updated_at = ? WHERE id = ?",
    )
    .bind(status)
    .bind(rejection_reason)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete an airdrop (campaigns cascade).
pub async fn delete_airdrop(pool: &SqlitePool, id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM airdrops WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DropiqDb;
    use crate::test_support::sample_airdrop;

    #[tokio::test]
    async fn test_duplicate_slug_and_name_rejected() {
        let db = DropiqDb::open_in_memory().await.unwrap();
        let pool = db.pool();

        create_airdrop(pool, &sample_airdrop("LayerZero", "layerzero"))
            .await
            .unwrap();

        let err = create_airdrop(pool, &sample_airdrop("Other", "layerzero"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = create_airdrop(pool, &sample_airdrop("LAYERZERO", "lz-2"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let count = count_airdrops(pool, &AirdropFilter::default()).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_find_conflict() {
        let db = DropiqDb::open_in_memory().await.unwrap();
        let pool = db.pool();

        let existing = sample_airdrop("zkSync Era", "zksync-era");
        create_airdrop(pool, &existing).await.unwrap();

        assert!(find_airdrop_conflict(pool, "other", "ZKSYNC ERA", None)
            .await
            .unwrap()
            .is_some());
        assert!(find_airdrop_conflict(pool, "zksync-era", "New", None)
            .await
            .unwrap()
            .is_some());
        assert!(find_airdrop_conflict(pool, "fresh", "Fresh", None)
            .await
            .unwrap()
            .is_none());
        // Editing an airdrop does not conflict with itself
        assert!(
            find_airdrop_conflict(pool, "zksync-era", "zkSync Era", Some(&existing.id))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_search() {
        let db = DropiqDb::open_in_memory().await.unwrap();
        let pool = db.pool();

        let a = sample_airdrop("Starknet", "starknet");
        let b = sample_airdrop("Scroll", "scroll");
        create_airdrop(pool, &a).await.unwrap();
        create_airdrop(pool, &b).await.unwrap();
        set_airdrop_status(pool, &a.id, AirdropStatus::Approved, None)
            .await
            .unwrap();

        let approved = list_airdrops(
            pool,
            &AirdropFilter {
                status: Some(AirdropStatus::Approved),
                limit: 50,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].slug, "starknet");

        let searched = list_airdrops(
            pool,
            &AirdropFilter {
                search: Some("SCRO".to_string()),
                limit: 50,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].name, "Scroll");
    }

    #[tokio::test]
    async fn test_reject_records_reason() {
        let db = DropiqDb::open_in_memory().await.unwrap();
        let pool = db.pool();

        let a = sample_airdrop("Fake Drop", "fake-drop");
        create_airdrop(pool, &a).await.unwrap();
        set_airdrop_status(pool, &a.id, AirdropStatus::Rejected, Some("phishing"))
            .await
            .unwrap();

        let stored = get_airdrop(pool, &a.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AirdropStatus::Rejected);
        assert_eq!(stored.rejection_reason.as_deref(), Some("phishing"));

        assert!(delete_airdrop(pool, &a.id).await.unwrap());
        assert!(get_airdrop_by_slug(pool, "fake-drop").await.unwrap().is_none());
    }
}
