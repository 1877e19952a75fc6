//! Response payloads carried in the envelope's `data` field.

use serde::{Deserialize, Serialize};

pub use dropiq_core::activity::{ActivityProfile, Recommendation};
pub use dropiq_core::services::{
    AirdropPage, AuthSession, BlacklistCheck, CreatedCampaign, EligibilityReport, SecurityReport,
    TwoFactorSetup, WalletChallenge, WebhookOutcome,
};
pub use dropiq_db::DbStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
}

/// Number of realtime subscribers an alert reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredResponse {
    pub delivered: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledResponse {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedResponse {
    pub received: bool,
}
