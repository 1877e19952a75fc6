//! Airdrop models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// A tracked token distribution event.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Airdrop {
    /// Unique identifier
    pub id: String,

    /// Project name (unique, case-insensitive)
    pub name: String,

    /// URL slug (unique)
    pub slug: String,

    /// Long description
    pub description: Option<String>,

    /// Official project URL
    pub project_url: Option<String>,

    /// Token or claim contract
    pub contract_address: Option<String>,

    /// EVM chain id
    pub chain_id: i64,

    /// Free-form category: 'defi', 'l2', 'nft', ...
    pub category: Option<String>,

    /// Moderation status
    pub status: AirdropStatus,

    /// Eligibility requirements as JSON, interpreted by the scoring layer
    pub requirements: Json<serde_json::Value>,

    /// Estimated value of the allocation in USD
    pub estimated_value_usd: Option<f64>,

    /// Claim/qualification deadline
    pub deadline: Option<DateTime<Utc>>,

    /// User who submitted the airdrop
    pub submitted_by: Option<String>,

    /// Moderator note when rejected
    pub rejection_reason: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Moderation status of an airdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AirdropStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for AirdropStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for AirdropStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Filter for airdrop listings.
#[derive(Debug, Clone, Default)]
pub struct AirdropFilter {
    pub status: Option<AirdropStatus>,
    pub chain_id: Option<i64>,
    /// Substring match on name, slug or description
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
