//! Wallet activity profiles and personalized airdrop ranking.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use dropiq_db::Airdrop;
use serde::{Deserialize, Serialize};

use crate::providers::ChainTransaction;
use crate::scoring::eligibility::{EligibilityRequirements, KNOWN_BRIDGES, KNOWN_DEX_ROUTERS};

/// Minimum number of timestamped transactions before interval regularity is judged.
const REGULARITY_MIN_TXS: usize = 5;
/// Gap coefficient of variation under which activity looks scripted.
const REGULARITY_MAX_CV: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityProfile {
    pub address: String,
    pub transaction_count: usize,
    pub active_days: usize,
    pub unique_contracts: usize,
    pub dex_transactions: usize,
    pub bridge_transactions: usize,
    pub first_activity: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub avg_transactions_per_active_day: f64,
    /// Chains with at least one transaction
    pub chains: Vec<u64>,
    /// Transactions arrive at near-constant intervals (bot-like)
    pub regular_interval: bool,
}

/// Derives [`ActivityProfile`]s from raw transactions.
#[derive(Debug, Clone)]
pub struct ActivityPatternAnalyzer {
    dex_routers: HashSet<String>,
    bridges: HashSet<String>,
}

impl Default for ActivityPatternAnalyzer {
    fn default() -> Self {
        Self {
            dex_routers: KNOWN_DEX_ROUTERS.iter().map(|a| a.to_string()).collect(),
            bridges: KNOWN_BRIDGES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl ActivityPatternAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze(&self, address: &str, transactions: &[ChainTransaction]) -> ActivityProfile {
        let targets: Vec<String> = transactions
            .iter()
            .filter_map(|tx| tx.to.as_deref().map(str::to_lowercase))
            .collect();

        let mut timestamps: Vec<DateTime<Utc>> =
            transactions.iter().filter_map(|tx| tx.timestamp).collect();
        timestamps.sort();

        let days: HashSet<NaiveDate> = timestamps.iter().map(|ts| ts.date_naive()).collect();
        let chains: BTreeSet<u64> = transactions.iter().map(|tx| tx.chain_id).collect();

        let active_days = days.len();
        let avg = if active_days == 0 {
            0.0
        } else {
            transactions.len() as f64 / active_days as f64
        };

        ActivityProfile {
            address: address.to_lowercase(),
            transaction_count: transactions.len(),
            active_days,
            unique_contracts: targets.iter().collect::<HashSet<_>>().len(),
            dex_transactions: targets.iter().filter(|t| self.dex_routers.contains(*t)).count(),
            bridge_transactions: targets.iter().filter(|t| self.bridges.contains(*t)).count(),
            first_activity: timestamps.first().copied(),
            last_activity: timestamps.last().copied(),
            avg_transactions_per_active_day: avg,
            chains: chains.into_iter().collect(),
            regular_interval: is_regular(&timestamps),
        }
    }
}

/// True when sorted timestamps have near-identical gaps.
fn is_regular(sorted: &[DateTime<Utc>]) -> bool {
    if sorted.len() < REGULARITY_MIN_TXS {
        return false;
    }
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64)
        .collect();
    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if mean <= 0.0 {
        return false;
    }
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    variance.sqrt() / mean < REGULARITY_MAX_CV
}

// ============================================================================
// Personalization
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub airdrop: Airdrop,
    /// 0-100
    pub score: u32,
    pub reasons: Vec<String>,
}

fn relevance(profile: &ActivityProfile, airdrop: &Airdrop, now: DateTime<Utc>) -> (u32, Vec<String>) {
    let requirements = EligibilityRequirements::from_json(&airdrop.requirements.0).unwrap_or_default();
    let mut score: i64 = 10;
    let mut reasons = Vec::new();

    if u64::try_from(airdrop.chain_id).is_ok_and(|c| profile.chains.contains(&c)) {
        score += 30;
        reasons.push("active on this chain".to_string());
    }
    if requirements.requires_dex && profile.dex_transactions > 0 {
        score += 20;
        reasons.push("already uses DEXes".to_string());
    }
    if requirements.requires_bridge && profile.bridge_transactions > 0 {
        score += 20;
        reasons.push("already bridges".to_string());
    }
    if let Some(min) = requirements.min_transactions {
        if profile.transaction_count >= min as usize {
            score += 10;
            reasons.push("meets transaction count".to_string());
        }
    }
    if airdrop.deadline.is_some_and(|d| d < now) {
        score -= 20;
        reasons.push("deadline passed".to_string());
    }

    (score.clamp(0, 100) as u32, reasons)
}

/// Rank airdrops for a profile, best first; ties broken by name.
pub fn rank_airdrops(
    profile: &ActivityProfile,
    airdrops: Vec<Airdrop>,
    now: DateTime<Utc>,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = airdrops
        .into_iter()
        .map(|airdrop| {
            let (score, reasons) = relevance(profile, &airdrop, now);
            Recommendation {
                airdrop,
                score,
                reasons,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.airdrop.name.cmp(&b.airdrop.name))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dropiq_db::{AirdropStatus, Json};
    use pretty_assertions::assert_eq;

    fn tx(to: &str, at: DateTime<Utc>, chain_id: u64) -> ChainTransaction {
        ChainTransaction {
            hash: format!("0x{}", at.timestamp()),
            from: "0x0000000000000000000000000000000000000001".into(),
            to: Some(to.into()),
            value: 0.1,
            timestamp: Some(at),
            chain_id,
        }
    }

    fn airdrop(name: &str, chain_id: i64, requirements: serde_json::Value) -> Airdrop {
        let now = Utc::now();
        Airdrop {
            id: name.to_lowercase(),
            name: name.into(),
            slug: name.to_lowercase(),
            description: None,
            project_url: None,
            contract_address: None,
            chain_id,
            category: None,
            status: AirdropStatus::Approved,
            requirements: Json(requirements),
            estimated_value_usd: None,
            deadline: None,
            submitted_by: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_history() {
        let profile = ActivityPatternAnalyzer::new().analyze("0xABC", &[]);
        assert_eq!(profile.address, "0xabc");
        assert_eq!(profile.transaction_count, 0);
        assert_eq!(profile.avg_transactions_per_active_day, 0.0);
        assert!(!profile.regular_interval);
        assert!(profile.chains.is_empty());
    }

    #[test]
    fn test_profile_counts() {
        let start = Utc::now() - Duration::days(10);
        let txs = vec![
            tx(KNOWN_DEX_ROUTERS[0], start, 1),
            tx(KNOWN_DEX_ROUTERS[0], start + Duration::hours(1), 1),
            tx(KNOWN_BRIDGES[0], start + Duration::days(2), 1),
            tx("0x00000000000000000000000000000000000000aa", start + Duration::days(5), 42161),
        ];
        let profile = ActivityPatternAnalyzer::new().analyze("0x1", &txs);
        assert_eq!(profile.transaction_count, 4);
        assert_eq!(profile.unique_contracts, 3);
        assert_eq!(profile.dex_transactions, 2);
        assert_eq!(profile.bridge_transactions, 1);
        assert_eq!(profile.chains, vec![1, 42161]);
        assert_eq!(profile.first_activity, Some(start));
        assert!(profile.active_days >= 3);
    }

    #[test]
    fn test_regular_interval_detection() {
        let start = Utc::now() - Duration::days(30);
        let scripted: Vec<_> = (0..6)
            .map(|i| tx("0xaa", start + Duration::hours(24 * i), 1))
            .collect();
        assert!(ActivityPatternAnalyzer::new().analyze("0x1", &scripted).regular_interval);

        let human: Vec<_> = [0, 1, 5, 6, 20, 21]
            .iter()
            .map(|h| tx("0xaa", start + Duration::hours(*h), 1))
            .collect();
        assert!(!ActivityPatternAnalyzer::new().analyze("0x1", &human).regular_interval);

        // Too few transactions to judge.
        assert!(!ActivityPatternAnalyzer::new().analyze("0x1", &scripted[..4]).regular_interval);
    }

    #[test]
    fn test_ranking() {
        let now = Utc::now();
        let profile = ActivityProfile {
            address: "0x1".into(),
            transaction_count: 12,
            active_days: 5,
            unique_contracts: 4,
            dex_transactions: 3,
            bridge_transactions: 0,
            first_activity: None,
            last_activity: None,
            avg_transactions_per_active_day: 2.4,
            chains: vec![1],
            regular_interval: false,
        };

        let mut expired = airdrop("Expired", 1, serde_json::json!({}));
        expired.deadline = Some(now - Duration::days(1));

        let ranked = rank_airdrops(
            &profile,
            vec![
                airdrop("Zeta", 10, serde_json::json!({})),
                airdrop("Best", 1, serde_json::json!({ "requires_dex": true, "min_transactions": 10 })),
                airdrop("Alpha", 10, serde_json::json!({ "requires_bridge": true })),
                expired,
            ],
            now,
        );

        let order: Vec<(&str, u32)> = ranked
            .iter()
            .map(|r| (r.airdrop.name.as_str(), r.score))
            .collect();
        // Best: 10 + 30 + 20 + 10; Expired: 10 + 30 - 20; ties ordered by name.
        assert_eq!(
            order,
            vec![("Best", 70), ("Expired", 20), ("Alpha", 10), ("Zeta", 10)]
        );
    }
}
