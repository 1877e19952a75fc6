//! Domain services.
//!
//! Each service owns clones of the handles it needs (database, provider
//! clients) and is constructed once at startup. All user-scoped operations
//! take the authenticated [`User`] explicitly.

pub mod activity;
pub mod airdrop;
pub mod alerts;
pub mod audit;
pub mod auth;
pub mod automation;
pub mod blacklist;
pub mod campaign;
pub mod eligibility;
pub mod profile;
pub mod security;
pub mod strategy;

pub use activity::ActivityService;
pub use airdrop::{AirdropPage, AirdropPatch, AirdropQuery, AirdropService, NewAirdrop};
pub use alerts::{AlertHub, AlertSeverity, SecurityAlert};
pub use auth::{AuthService, AuthSession, TwoFactorSetup, WalletChallenge};
pub use automation::{AutomationService, NewTask, StatusUpdate};
pub use blacklist::{BlacklistCheck, BlacklistService, NewBlacklistEntry};
pub use campaign::{CampaignService, CreatedCampaign, NewCampaign, WebhookOutcome};
pub use eligibility::{EligibilityChecker, EligibilityReport};
pub use profile::{NewWallet, ProfileService, ProfileUpdate};
pub use security::{SecurityAnalyzer, SecurityReport, SecurityTarget};
pub use strategy::{NewComment, NewStrategy, NewTip, StrategyPatch, StrategyQuery, StrategyService};

use dropiq_db::User;

use crate::error::{CoreError, CoreResult};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Fail with `Forbidden` unless the user is an admin.
pub fn require_admin(user: &User) -> CoreResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden("admin role required".to_string()))
    }
}

/// Clamp a requested page size.
pub fn page_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Trim a required text field, rejecting empty or over-long values.
pub(crate) fn required_text(field: &str, value: &str, max_chars: usize) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(CoreError::validation(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`] but `None` and blank strings become `None`.
pub(crate) fn optional_text(
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> CoreResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => required_text(field, v, max_chars).map(Some),
        None => Ok(None),
    }
}

/// Validate an absolute http(s) URL.
pub(crate) fn http_url(field: &str, value: &str) -> CoreResult<String> {
    let parsed = url::Url::parse(value.trim())
        .map_err(|_| CoreError::validation(field, "must be an absolute URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoreError::validation(field, "must use http or https"));
    }
    Ok(parsed.to_string())
}
