//! Security analysis of URLs and token contracts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dropiq_auth::normalize_address;
use dropiq_db::{queries, BlacklistEntry, BlacklistType, DropiqDb, User};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::airdrop::load_visible;
use crate::error::{CoreError, CoreResult};
use crate::providers::{ContractRisk, ContractRiskProvider};
use crate::scoring::{assess_url, score_security, SecurityScore, SecuritySignals, UrlAssessment};

const DEFAULT_CHAIN: u64 = 1;

/// What to analyze. At least one of `url` and `contract_address` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityTarget {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    #[serde(flatten)]
    pub score: SecurityScore,
    pub url: Option<UrlAssessment>,
    pub contract_address: Option<String>,
    pub chain_id: Option<u64>,
    pub contract_risk: Option<ContractRisk>,
    pub failed_sources: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

fn blacklist_reason(entry: BlacklistEntry) -> String {
    entry.reason.unwrap_or(entry.source)
}

/// The host itself, then each parent domain with at least two labels.
pub(crate) fn domain_candidates(host: &str) -> Vec<&str> {
    let mut candidates = vec![host];
    let mut rest = host;
    while let Some((_, parent)) = rest.split_once('.') {
        if !parent.contains('.') {
            break;
        }
        candidates.push(parent);
        rest = parent;
    }
    candidates
}

#[derive(Debug, Clone)]
pub struct SecurityAnalyzer {
    db: DropiqDb,
    risk: Arc<dyn ContractRiskProvider>,
    popular_domains: Arc<Vec<String>>,
}

impl SecurityAnalyzer {
    pub fn new(
        db: DropiqDb,
        risk: Arc<dyn ContractRiskProvider>,
        popular_domains: Vec<String>,
    ) -> Self {
        Self {
            db,
            risk,
            popular_domains: Arc::new(popular_domains),
        }
    }

    async fn domain_blacklisted(&self, host: &str) -> CoreResult<Option<String>> {
        for candidate in domain_candidates(host) {
            if let Some(entry) =
                queries::find_blacklisted(self.db.pool(), BlacklistType::Domain, candidate).await?
            {
                return Ok(Some(blacklist_reason(entry)));
            }
        }
        Ok(None)
    }

    pub async fn analyze(&self, target: &SecurityTarget) -> CoreResult<SecurityReport> {
        let url = target.url.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let contract = target
            .contract_address
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if url.is_none() && contract.is_none() {
            return Err(CoreError::validation(
                "target",
                "provide a url, a contract_address, or both",
            ));
        }

        let mut signals = SecuritySignals::default();
        let mut failed_sources = Vec::new();

        if let Some(url) = url {
            let assessment = assess_url(url, &self.popular_domains)?;
            signals.domain_blacklisted = self.domain_blacklisted(&assessment.host).await?;
            signals.url = Some(assessment);
        }

        let contract = contract
            .map(|c| {
                normalize_address(c).map_err(|_| {
                    CoreError::validation(
                        "contract_address",
                        "must be a 0x-prefixed 20-byte hex address",
                    )
                })
            })
            .transpose()?;
        let chain_id = contract.as_ref().map(|_| target.chain_id.unwrap_or(DEFAULT_CHAIN));

        if let (Some(address), Some(chain_id)) = (&contract, chain_id) {
            signals.contract_blacklisted =
                queries::find_blacklisted(self.db.pool(), BlacklistType::ContractAddress, address)
                    .await?
                    .map(blacklist_reason);

            match self.risk.token_security(chain_id, address).await {
                Ok(risk) => signals.contract_risk = risk,
                Err(e) => {
                    warn!(%address, chain_id, error = %e, "Contract risk lookup failed");
                    failed_sources.push("contract_risk".to_string());
                }
            }
        }

        let score = score_security(&signals);
        debug!(score = score.score, level = ?score.level, "Security analysis complete");

        Ok(SecurityReport {
            score,
            url: signals.url,
            contract_address: contract,
            chain_id,
            contract_risk: signals.contract_risk,
            failed_sources,
            analyzed_at: Utc::now(),
        })
    }

    /// Analyze an airdrop's project URL and contract.
    pub async fn analyze_airdrop(
        &self,
        viewer: Option<&User>,
        airdrop_id: &str,
    ) -> CoreResult<SecurityReport> {
        let airdrop = load_visible(&self.db, airdrop_id, viewer).await?;
        if airdrop.project_url.is_none() && airdrop.contract_address.is_none() {
            return Err(CoreError::validation(
                "airdrop",
                "has no project URL or contract to analyze",
            ));
        }
        self.analyze(&SecurityTarget {
            url: airdrop.project_url,
            contract_address: airdrop.contract_address,
            chain_id: Some(airdrop.chain_id.max(1) as u64),
        })
        .await
    }
}
