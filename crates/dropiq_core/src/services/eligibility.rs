//! On-chain eligibility checks for an airdrop.

use chrono::{DateTime, Utc};
use dropiq_auth::normalize_address;
use dropiq_db::{DropiqDb, User};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::airdrop::load_visible;
use crate::error::{CoreError, CoreResult};
use crate::providers::ProviderRegistry;
use crate::scoring::{score_eligibility, EligibilityRequirements, EligibilityScore, OnChainObservations};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub airdrop_id: String,
    pub address: String,
    pub chain_id: u64,
    #[serde(flatten)]
    pub score: EligibilityScore,
    /// Data sources that failed and were scored as empty
    pub failed_sources: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

/// Keep a fetched branch, or log and record it as failed.
fn keep<T: Default>(result: CoreResult<T>, source: &str, failed: &mut Vec<String>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(source, error = %e, "Dropping failed chain data source");
            failed.push(source.to_string());
            T::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct EligibilityChecker {
    db: DropiqDb,
    registry: ProviderRegistry,
}

impl EligibilityChecker {
    pub fn new(db: DropiqDb, registry: ProviderRegistry) -> Self {
        Self { db, registry }
    }

    /// Score `address` against an airdrop's requirements.
    ///
    /// Transactions, balances and NFTs are fetched concurrently; a failing
    /// source contributes nothing rather than failing the whole check.
    pub async fn check(
        &self,
        viewer: Option<&User>,
        airdrop_id: &str,
        address: &str,
        chain_id: Option<u64>,
    ) -> CoreResult<EligibilityReport> {
        let address = normalize_address(address)
            .map_err(|_| CoreError::validation("address", "must be a 0x-prefixed 20-byte hex address"))?;
        let airdrop = load_visible(&self.db, airdrop_id, viewer).await?;

        let requirements = EligibilityRequirements::from_json(&airdrop.requirements.0)
            .map_err(|e| CoreError::validation("requirements", e.to_string()))?;
        let chain_id = chain_id.unwrap_or(airdrop.chain_id.max(1) as u64);
        let provider = self.registry.get(chain_id)?;

        let (transactions, balances, nfts) = tokio::join!(
            provider.transactions(&address),
            provider.token_balances(&address),
            provider.nfts(&address),
        );

        let mut failed_sources = Vec::new();
        let observations = OnChainObservations {
            transactions: keep(transactions, "transactions", &mut failed_sources),
            token_balances: keep(balances, "token_balances", &mut failed_sources),
            nfts: keep(nfts, "nfts", &mut failed_sources),
        };

        let score = score_eligibility(&requirements, &observations);
        debug!(
            airdrop_id,
            %address,
            chain_id,
            score = score.score,
            "Eligibility scored"
        );

        Ok(EligibilityReport {
            airdrop_id: airdrop.id,
            address,
            chain_id,
            score,
            failed_sources,
            checked_at: Utc::now(),
        })
    }
}
