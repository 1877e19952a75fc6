//! Paid promotional campaigns: checkout, moderation, refunds and payment webhooks.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dropiq_db::{queries, Campaign, CampaignStatus, DropiqDb, PaymentStatus, User};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::airdrop::load_visible;
use super::{audit, optional_text, require_admin, required_text};
use crate::config::PaymentsConfig;
use crate::error::{CoreError, CoreResult};
use crate::providers::{verify_webhook_signature, CheckoutRequest, PaymentProvider, WebhookEvent};

const MIN_BUDGET_CENTS: i64 = 100;
const MAX_BUDGET_CENTS: i64 = 100_000_000;
const MAX_DURATION_DAYS: i64 = 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    pub airdrop_id: String,
    pub title: String,
    pub budget_cents: i64,
    #[serde(default)]
    pub currency: Option<String>,
    pub duration_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedCampaign {
    pub campaign: Campaign,
    /// Hosted checkout page the owner pays on
    pub checkout_url: Option<String>,
}

/// What a verified webhook delivery did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Updated {
        event_type: String,
        campaign_id: String,
        payment_status: PaymentStatus,
    },
    /// Event type we don't act on, or no matching campaign
    Ignored { event_type: String },
}

fn valid_currency(raw: &str) -> CoreResult<String> {
    let currency = raw.trim().to_lowercase();
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_lowercase()) {
        Ok(currency)
    } else {
        Err(CoreError::validation("currency", "must be a 3-letter ISO code"))
    }
}

#[derive(Debug, Clone)]
pub struct CampaignService {
    db: DropiqDb,
    payments: Arc<dyn PaymentProvider>,
    config: Arc<PaymentsConfig>,
}

impl CampaignService {
    pub fn new(db: DropiqDb, payments: Arc<dyn PaymentProvider>, config: PaymentsConfig) -> Self {
        Self {
            db,
            payments,
            config: Arc::new(config),
        }
    }

    /// Open a checkout session, then record the campaign as awaiting payment.
    pub async fn create(&self, owner: &User, input: &NewCampaign) -> CoreResult<CreatedCampaign> {
        let title = required_text("title", &input.title, 120)?;
        if !(MIN_BUDGET_CENTS..=MAX_BUDGET_CENTS).contains(&input.budget_cents) {
            return Err(CoreError::validation(
                "budget_cents",
                format!("must be between {MIN_BUDGET_CENTS} and {MAX_BUDGET_CENTS}"),
            ));
        }
        if !(1..=MAX_DURATION_DAYS).contains(&input.duration_days) {
            return Err(CoreError::validation(
                "duration_days",
                format!("must be between 1 and {MAX_DURATION_DAYS}"),
            ));
        }
        let currency = valid_currency(
            input
                .currency
                .as_deref()
                .unwrap_or(&self.config.default_currency),
        )?;
        let airdrop = load_visible(&self.db, &input.airdrop_id, Some(owner)).await?;

        let id = Uuid::new_v4().to_string();
        let session = self
            .payments
            .create_checkout_session(&CheckoutRequest {
                reference_id: id.clone(),
                description: format!("DropIQ campaign: {} ({})", title, airdrop.name),
                amount_cents: input.budget_cents,
                currency: currency.clone(),
                success_url: self.config.success_url.clone(),
                cancel_url: self.config.cancel_url.clone(),
            })
            .await?;

        let now = Utc::now();
        let campaign = Campaign {
            id,
            airdrop_id: airdrop.id,
            owner_id: owner.id.clone(),
            title,
            budget_cents: input.budget_cents,
            currency,
            duration_days: input.duration_days,
            status: CampaignStatus::PendingPayment,
            payment_status: PaymentStatus::Unpaid,
            payment_session_id: Some(session.id),
            payment_intent_id: None,
            rejection_reason: None,
            approved_at: None,
            starts_at: None,
            ends_at: None,
            created_at: now,
            updated_at: now,
        };
        queries::create_campaign(self.db.pool(), &campaign).await?;
        info!(campaign_id = %campaign.id, owner_id = %owner.id, "Campaign created");

        Ok(CreatedCampaign {
            campaign,
            checkout_url: session.url,
        })
    }

    /// The caller's campaigns; admins see everyone's.
    pub async fn list(&self, user: &User, status: Option<CampaignStatus>) -> CoreResult<Vec<Campaign>> {
        let owner = (!user.is_admin()).then_some(user.id.as_str());
        Ok(queries::list_campaigns(self.db.pool(), owner, status).await?)
    }

    async fn load(&self, id: &str) -> CoreResult<Campaign> {
        queries::get_campaign(self.db.pool(), id)
            .await?
            .ok_or_else(|| CoreError::not_found("Campaign", id))
    }

    pub async fn get(&self, user: &User, id: &str) -> CoreResult<Campaign> {
        let campaign = self.load(id).await?;
        if campaign.owner_id != user.id && !user.is_admin() {
            return Err(CoreError::Forbidden("not the campaign owner".to_string()));
        }
        Ok(campaign)
    }

    /// Approve a paid campaign; it runs from now for its duration.
    pub async fn approve(&self, admin: &User, id: &str) -> CoreResult<Campaign> {
        require_admin(admin)?;
        let campaign = self.load(id).await?;
        match campaign.status {
            CampaignStatus::Approved => {
                return Err(CoreError::Conflict("campaign is already approved".to_string()))
            }
            CampaignStatus::Rejected => {
                return Err(CoreError::Conflict("campaign was rejected".to_string()))
            }
            _ => {}
        }
        if campaign.payment_status != PaymentStatus::Paid {
            return Err(CoreError::Conflict(format!(
                "campaign payment is {}, not paid",
                campaign.payment_status
            )));
        }

        let starts_at = Utc::now();
        let ends_at = starts_at + Duration::days(campaign.duration_days);
        queries::approve_campaign(self.db.pool(), id, starts_at, ends_at).await?;
        info!(campaign_id = %id, "Campaign approved");
        audit::record(self.db.pool(), Some(&admin.id), "campaign.approve", "campaign", Some(id), None).await;
        self.load(id).await
    }

    /// Reject a campaign, refunding it first when asked and it was paid.
    ///
    /// A refund failure is logged and does not stop the rejection.
    pub async fn reject(
        &self,
        admin: &User,
        id: &str,
        reason: Option<&str>,
        refund: bool,
    ) -> CoreResult<Campaign> {
        require_admin(admin)?;
        let reason = optional_text("reason", reason, 1000)?;
        let campaign = self.load(id).await?;
        if campaign.status == CampaignStatus::Rejected {
            return Err(CoreError::Conflict("campaign is already rejected".to_string()));
        }

        if refund && campaign.payment_status == PaymentStatus::Paid {
            match campaign.payment_intent_id.as_deref() {
                Some(intent) => match self.payments.refund(intent).await {
                    Ok(receipt) => {
                        info!(campaign_id = %id, refund_id = %receipt.id, "Campaign refunded");
                        queries::set_campaign_payment_status(self.db.pool(), id, PaymentStatus::Refunded)
                            .await?;
                    }
                    Err(e) => warn!(campaign_id = %id, error = %e, "Refund failed; rejecting anyway"),
                },
                None => warn!(campaign_id = %id, "Paid campaign has no payment intent to refund"),
            }
        }

        queries::reject_campaign(self.db.pool(), id, reason.as_deref()).await?;
        info!(campaign_id = %id, "Campaign rejected");
        audit::record(
            self.db.pool(),
            Some(&admin.id),
            "campaign.reject",
            "campaign",
            Some(id),
            reason,
        )
        .await;
        self.load(id).await
    }

    async fn find_for_event(&self, event: &WebhookEvent, by_session: bool) -> CoreResult<Option<Campaign>> {
        let pool = self.db.pool();
        let direct = if by_session {
            match event.object_id() {
                Some(session) => queries::get_campaign_by_session(pool, session).await?,
                None => None,
            }
        } else {
            match event.payment_intent() {
                Some(intent) => queries::get_campaign_by_payment_intent(pool, intent).await?,
                None => None,
            }
        };
        if direct.is_some() {
            return Ok(direct);
        }
        match event.campaign_reference() {
            Some(id) => Ok(queries::get_campaign(pool, id).await?),
            None => Ok(None),
        }
    }

    /// Verify and apply a payment webhook delivery.
    pub async fn handle_webhook(&self, payload: &[u8], signature: &str) -> CoreResult<WebhookOutcome> {
        verify_webhook_signature(
            payload,
            signature,
            &self.config.webhook_secret,
            Utc::now().timestamp(),
            self.config.webhook_tolerance_secs,
        )?;
        let event = WebhookEvent::parse(payload)?;
        let event_type = event.event_type.clone();

        let (by_session, payment_status) = match event_type.as_str() {
            "checkout.session.completed" => (true, PaymentStatus::Paid),
            "checkout.session.expired" => (true, PaymentStatus::Failed),
            "payment_intent.payment_failed" => (false, PaymentStatus::Failed),
            "charge.refunded" => (false, PaymentStatus::Refunded),
            _ => {
                warn!(event_id = %event.id, %event_type, "Ignoring unhandled webhook event");
                return Ok(WebhookOutcome::Ignored { event_type });
            }
        };

        let Some(campaign) = self.find_for_event(&event, by_session).await? else {
            warn!(event_id = %event.id, %event_type, "Webhook event matches no campaign");
            return Ok(WebhookOutcome::Ignored { event_type });
        };

        let pool = self.db.pool();
        let applied = match payment_status {
            PaymentStatus::Paid => {
                queries::mark_campaign_paid(pool, &campaign.id, event.payment_intent()).await?
            }
            PaymentStatus::Failed => queries::mark_campaign_payment_failed(pool, &campaign.id).await?,
            _ => queries::set_campaign_payment_status(pool, &campaign.id, payment_status).await?,
        };
        if !applied {
            warn!(
                event_id = %event.id,
                campaign_id = %campaign.id,
                %event_type,
                current = %campaign.payment_status,
                "Ignoring payment failure for a campaign that is no longer unpaid"
            );
            return Ok(WebhookOutcome::Ignored { event_type });
        }
        info!(
            campaign_id = %campaign.id,
            %event_type,
            payment_status = %payment_status,
            "Applied payment webhook"
        );

        Ok(WebhookOutcome::Updated {
            event_type,
            campaign_id: campaign.id,
            payment_status,
        })
    }
}
