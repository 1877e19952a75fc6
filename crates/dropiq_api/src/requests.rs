//! Request bodies and query strings.

use dropiq_core::services::AlertSeverity;
use dropiq_db::{BlacklistType, CampaignStatus, TaskStatus};
use serde::{Deserialize, Serialize};

pub use dropiq_core::services::{
    AirdropPatch, AirdropQuery, NewAirdrop, NewBlacklistEntry, NewCampaign, NewComment,
    NewStrategy, NewTask, NewTip, NewWallet, ProfileUpdate, SecurityTarget, StatusUpdate,
    StrategyPatch, StrategyQuery,
};

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Required once two-factor auth is enabled
    #[serde(default)]
    pub totp_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletNonceRequest {
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletVerifyRequest {
    pub address: String,
    /// 65-byte personal_sign signature, hex
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpCodeRequest {
    pub code: String,
}

// ============================================================================
// Airdrops
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectAirdropRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    pub address: String,
    /// Defaults to the airdrop's chain
    #[serde(default)]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedQuery {
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityQuery {
    pub chain_id: Option<u64>,
}

// ============================================================================
// Campaigns
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignListQuery {
    pub status: Option<CampaignStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectCampaignRequest {
    #[serde(default)]
    pub reason: Option<String>,
    /// Refund the payment if the campaign was paid
    #[serde(default)]
    pub refund: bool,
}

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRequest {
    pub rating: i64,
}

// ============================================================================
// Blacklist
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlacklistListQuery {
    #[serde(rename = "type")]
    pub entry_type: Option<BlacklistType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistCheckQuery {
    pub value: String,
}

// ============================================================================
// Automation
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
}

// ============================================================================
// Admin
// ============================================================================

fn default_severity() -> AlertSeverity {
    AlertSeverity::Warning
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastAlertRequest {
    pub title: String,
    pub message: String,
    #[serde(default = "default_severity")]
    pub severity: AlertSeverity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// Query string accepted by the WebSocket upgrade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}
