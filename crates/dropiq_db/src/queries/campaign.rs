//! Campaign queries.
//!
//! Status transitions are owned by the approve/reject/webhook paths; each
//! transition here is a single UPDATE.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use crate::models::{Campaign, CampaignStatus, PaymentStatus};

/// Create a campaign.
pub async fn create_campaign(pool: &SqlitePool, campaign: &Campaign) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO campaigns (id, airdrop_id, owner_id, title, budget_cents, currency,
                               duration_days, status, payment_status, payment_session_id,
                               payment_intent_id, rejection_reason, approved_at, starts_at,
                               ends_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&campaign.id)
    .bind(&campaign.airdrop_id)
    .bind(&campaign.owner_id)
    .bind(&campaign.title)
    .bind(campaign.budget_cents)
    .bind(&campaign.currency)
    .bind(campaign.duration_days)
    .bind(campaign.status)
    .bind(campaign.payment_status)
    .bind(&campaign.payment_session_id)
    .bind(&campaign.payment_intent_id)
    .bind(&campaign.rejection_reason)
    .bind(campaign.approved_at)
    .bind(campaign.starts_at)
    .bind(campaign.ends_at)
    .bind(campaign.created_at)
    .bind(campaign.updated_at)
    .execute(pool)
    .await
    .map_err(|e| DbError::from_insert(e, "Campaign", campaign.id.clone()))?;
    Ok(())
}

/// Get a campaign by ID.
pub async fn get_campaign(pool: &SqlitePool, id: &str) -> DbResult<Option<Campaign>> {
    let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(campaign)
}

/// Get a campaign by its payment-provider checkout session id.
pub async fn get_campaign_by_session(
    pool: &SqlitePool,
    session_id: &str,
) -> DbResult<Option<Campaign>> {
    let campaign =
        sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE payment_session_id = ?")
            .bind(session_id)
            .fetch_optional(pool)
            .await?;
    Ok(campaign)
}

/// Get a campaign by payment intent id.
pub async fn get_campaign_by_payment_intent(
    pool: &SqlitePool,
    payment_intent_id: &str,
) -> DbResult<Option<Campaign>> {
    let campaign =
        sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE payment_intent_id = ?")
            .bind(payment_intent_id)
            .fetch_optional(pool)
            .await?;
    Ok(campaign)
}

/// List campaigns, optionally restricted to one owner and/or status.
pub async fn list_campaigns(
    pool: &SqlitePool,
    owner_id: Option<&str>,
    status: Option<CampaignStatus>,
) -> DbResult<Vec<Campaign>> {
    let campaigns = sqlx::query_as::<_, Campaign>(
        r#"
        SELECT * FROM campaigns
        WHERE (? IS NULL OR owner_id = ?)
          AND (? IS NULL OR status = ?)
        ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .bind(owner_id)
    .bind(status)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(campaigns)
}

/// Record a completed checkout.
pub async fn mark_campaign_paid(
    pool: &SqlitePool,
    id: &str,
    payment_intent_id: Option<&str>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE campaigns
        SET status = CASE WHEN status = 'pending_payment' THEN 'paid' ELSE status END,
            payment_status = 'paid',
            payment_intent_id = COALESCE(?, payment_intent_id),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(payment_intent_id)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Set only the payment status.
pub async fn set_campaign_payment_status(
    pool: &SqlitePool,
    id: &str,
    payment_status: PaymentStatus,
) -> DbResult<bool> {
    let result =
        sqlx::query("UPDATE campaigns SET payment_status = ?, updated_at = ? WHERE id = ?")
            .bind(payment_status)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Record a failed or expired checkout.
///
/// Only an `unpaid` campaign is touched, so a late failure event cannot
/// demote a payment that already settled. Returns false when nothing changed.
pub async fn mark_campaign_payment_failed(pool: &SqlitePool, id: &str) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE campaigns SET payment_status = 'failed', updated_at = ? WHERE id = ? AND payment_status = 'unpaid'",
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Approve a campaign and set its live window.
pub async fn approve_campaign(
    pool: &SqlitePool,
    id: &str,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> DbResult<bool> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        UPDATE campaigns
        SET status = 'approved', approved_at = ?, starts_at = ?, ends_at = ?,
            rejection_reason = NULL, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(starts_at)
    .bind(ends_at)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Reject a campaign.
pub async fn reject_campaign(pool: &SqlitePool, id: &str, reason: Option<&str>) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE campaigns SET status = 'rejected', rejection_reason = ?, updated_at = ? WHERE id = ?",
    )
    .bind(reason)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DropiqDb;
    use crate::queries::{create_airdrop, create_user};
    use crate::test_support::{sample_airdrop, sample_campaign, sample_user};

    #[tokio::test]
    async fn test_campaign_payment_lifecycle() {
        let db = DropiqDb::open_in_memory().await.unwrap();
        let pool = db.pool();

        let owner = sample_user("owner@example.com");
        create_user(pool, &owner).await.unwrap();
        let airdrop = sample_airdrop("Blast", "blast");
        create_airdrop(pool, &airdrop).await.unwrap();

        let campaign = sample_campaign(&airdrop.id, &owner.id, "cs_test_1");
        create_campaign(pool, &campaign).await.unwrap();

        let by_session = get_campaign_by_session(pool, "cs_test_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_session.id, campaign.id);
        assert_eq!(by_session.status, CampaignStatus::PendingPayment);

        mark_campaign_paid(pool, &campaign.id, Some("pi_123"))
            .await
            .unwrap();
        let paid = get_campaign(pool, &campaign.id).await.unwrap().unwrap();
        assert_eq!(paid.status, CampaignStatus::Paid);
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.payment_intent_id.as_deref(), Some("pi_123"));

        assert!(!mark_campaign_payment_failed(pool, &campaign.id).await.unwrap());
        let still_paid = get_campaign(pool, &campaign.id).await.unwrap().unwrap();
        assert_eq!(still_paid.payment_status, PaymentStatus::Paid);

        let now = Utc::now();
        approve_campaign(pool, &campaign.id, now, now + chrono::Duration::days(7))
            .await
            .unwrap();
        let approved = get_campaign(pool, &campaign.id).await.unwrap().unwrap();
        assert_eq!(approved.status, CampaignStatus::Approved);
        assert!(approved.approved_at.is_some());
    }

    #[tokio::test]
    async fn test_list_campaigns_by_owner() {
        let db = DropiqDb::open_in_memory().await.unwrap();
        let pool = db.pool();

        let alice = sample_user("alice@example.com");
        let bob = sample_user("bob@example.com");
        create_user(pool, &alice).await.unwrap();
        create_user(pool, &bob).await.unwrap();
        let airdrop = sample_airdrop("Linea", "linea");
        create_airdrop(pool, &airdrop).await.unwrap();

        create_campaign(pool, &sample_campaign(&airdrop.id, &alice.id, "cs_a"))
            .await
            .unwrap();
        let bobs = sample_campaign(&airdrop.id, &bob.id, "cs_b");
        create_campaign(pool, &bobs).await.unwrap();
        reject_campaign(pool, &bobs.id, Some("spam")).await.unwrap();

        assert_eq!(list_campaigns(pool, Some(&alice.id), None).await.unwrap().len(), 1);
        assert_eq!(list_campaigns(pool, None, None).await.unwrap().len(), 2);
        let rejected = list_campaigns(pool, None, Some(CampaignStatus::Rejected))
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].rejection_reason.as_deref(), Some("spam"));
    }
}
