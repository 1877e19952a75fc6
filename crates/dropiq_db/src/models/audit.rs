//! Audit trail of administrative actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recorded administrative action.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    /// User who performed the action (None for system/webhook actions)
    pub actor_id: Option<String>,
    /// Verb such as 'airdrop.approve' or 'campaign.reject'
    pub action: String,
    /// Entity kind acted upon
    pub target_type: String,
    pub target_id: Option<String>,
    /// Free-form detail
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}
