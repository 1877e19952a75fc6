//! Wallet activity profiles and personalized recommendations.

use chrono::Utc;
use dropiq_auth::normalize_address;
use dropiq_db::{queries, AirdropFilter, AirdropStatus, DropiqDb};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::activity::{rank_airdrops, ActivityPatternAnalyzer, ActivityProfile, Recommendation};
use crate::error::{CoreError, CoreResult};
use crate::providers::{ChainTransaction, ProviderRegistry};

/// Upper bound on airdrops considered for ranking.
const MAX_RANKED_AIRDROPS: i64 = 500;

#[derive(Debug, Clone)]
pub struct ActivityService {
    db: DropiqDb,
    registry: ProviderRegistry,
    analyzer: ActivityPatternAnalyzer,
}

impl ActivityService {
    pub fn new(db: DropiqDb, registry: ProviderRegistry) -> Self {
        Self {
            db,
            registry,
            analyzer: ActivityPatternAnalyzer::new(),
        }
    }

    /// Fetch transactions from every requested chain; failed chains are skipped.
    async fn transactions(&self, address: &str, chains: &[u64]) -> CoreResult<Vec<ChainTransaction>> {
        let providers = chains
            .iter()
            .map(|id| self.registry.get(*id))
            .collect::<CoreResult<Vec<_>>>()?;

        let results = join_all(providers.iter().map(|p| p.transactions(address))).await;

        let mut transactions = Vec::new();
        for (chain_id, result) in chains.iter().zip(results) {
            match result {
                Ok(txs) => transactions.extend(txs),
                Err(e) => warn!(chain_id, error = %e, "Dropping chain from activity profile"),
            }
        }
        Ok(transactions)
    }

    /// Profile a wallet on one chain, or on every configured chain.
    pub async fn profile(&self, address: &str, chain_id: Option<u64>) -> CoreResult<ActivityProfile> {
        let address = normalize_address(address)
            .map_err(|_| CoreError::validation("address", "must be a 0x-prefixed 20-byte hex address"))?;
        let chains = match chain_id {
            Some(id) => vec![id],
            None => self.registry.chain_ids(),
        };

        let transactions = self.transactions(&address, &chains).await?;
        debug!(%address, chains = ?chains, count = transactions.len(), "Fetched wallet activity");
        Ok(self.analyzer.analyze(&address, &transactions))
    }

    /// Rank approved airdrops for a wallet.
    pub async fn recommend(&self, address: &str) -> CoreResult<Vec<Recommendation>> {
        let profile = self.profile(address, None).await?;
        let filter = AirdropFilter {
            status: Some(AirdropStatus::Approved),
            limit: MAX_RANKED_AIRDROPS,
            ..Default::default()
        };
        let airdrops = queries::list_airdrops(self.db.pool(), &filter).await?;
        Ok(rank_airdrops(&profile, airdrops, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::config::ChainsConfig;
    use crate::test_support::{create_airdrop, test_db, FakeChain};
    use pretty_assertions::assert_eq;

    const WALLET: &str = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf";

    fn tx(chain_id: u64, days_ago: i64) -> ChainTransaction {
        ChainTransaction {
            hash: format!("0x{chain_id}{days_ago}"),
            from: WALLET.into(),
            to: Some("0x4444444444444444444444444444444444444444".into()),
            value: 0.01,
            timestamp: Some(Utc::now() - Duration::days(days_ago)),
            chain_id,
        }
    }

    fn registry(chains: Vec<FakeChain>) -> ProviderRegistry {
        let registry = ProviderRegistry::new(reqwest::Client::new(), &ChainsConfig::default());
        for chain in chains {
            registry.insert(Arc::new(chain));
        }
        registry
    }

    #[tokio::test]
    async fn test_profile_merges_chains_and_skips_failures() {
        let mut mainnet = FakeChain::new(1);
        mainnet.transactions = vec![tx(1, 1), tx(1, 3)];
        let mut arbitrum = FakeChain::new(42161);
        arbitrum.transactions = vec![tx(42161, 2)];
        let mut broken = FakeChain::new(10);
        broken.fail_transactions = true;

        let service = ActivityService::new(test_db().await, registry(vec![mainnet, arbitrum, broken]));

        let profile = service.profile(WALLET, None).await.unwrap();
        assert_eq!(profile.transaction_count, 3);
        assert_eq!(profile.chains, vec![1, 42161]);

        let single = service.profile(WALLET, Some(1)).await.unwrap();
        assert_eq!(single.transaction_count, 2);

        assert!(service.profile(WALLET, Some(5)).await.is_err());
    }

    #[tokio::test]
    async fn test_recommend_only_approved_ranked() {
        let db = test_db().await;
        create_airdrop(&db, "Beta", AirdropStatus::Approved, serde_json::json!({ "min_transactions": 1 })).await;
        create_airdrop(&db, "Alpha", AirdropStatus::Approved, serde_json::json!({})).await;
        create_airdrop(&db, "Pending", AirdropStatus::Pending, serde_json::json!({})).await;

        let mut mainnet = FakeChain::new(1);
        mainnet.transactions = vec![tx(1, 1)];
        let service = ActivityService::new(db, registry(vec![mainnet]));

        let ranked = service.recommend(WALLET).await.unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.airdrop.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(ranked[0].score, 50);
        assert_eq!(ranked[1].score, 40);
    }
}
