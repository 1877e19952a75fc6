//! Paid promotional campaign models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A paid placement promoting one airdrop.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier
    pub id: String,

    /// Promoted airdrop
    pub airdrop_id: String,

    /// Purchasing user
    pub owner_id: String,

    /// Campaign headline
    pub title: String,

    /// Price paid, in minor currency units
    pub budget_cents: i64,

    /// ISO currency code, lowercase
    pub currency: String,

    /// Placement length once approved
    pub duration_days: i64,

    /// Lifecycle status
    pub status: CampaignStatus,

    /// Payment state as reported by the payment provider
    pub payment_status: PaymentStatus,

    /// Checkout session id at the payment provider
    pub payment_session_id: Option<String>,

    /// Payment intent id, known once checkout completes
    pub payment_intent_id: Option<String>,

    /// Moderator note when rejected
    pub rejection_reason: Option<String>,

    pub approved_at: Option<DateTime<Utc>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Created, waiting for checkout to complete
    PendingPayment,
    /// Paid, waiting for moderation
    Paid,
    /// Live
    Approved,
    /// Declined by a moderator
    Rejected,
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingPayment => write!(f, "pending_payment"),
            Self::Paid => write!(f, "paid"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Payment state of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
            Self::Refunded => write!(f, "refunded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
