//! Eligibility heuristic: how likely a wallet is to qualify for an airdrop.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::providers::{ChainTransaction, NftHolding, TokenBalance};

/// Minimum score for a wallet to be considered eligible.
pub const ELIGIBILITY_THRESHOLD: u32 = 30;

const POINTS_CONTRACT_INTERACTION: u32 = 40;
const POINTS_MIN_BALANCE: u32 = 30;
const POINTS_NFT: u32 = 30;
const POINTS_MIN_TRANSACTIONS: u32 = 20;
const POINTS_DEX: u32 = 25;
const POINTS_BRIDGE: u32 = 25;

/// Well-known DEX routers (Ethereum mainnet deployments, lowercased).
pub const KNOWN_DEX_ROUTERS: &[&str] = &[
    "0x7a250d5630b4cf539739df2c5dacb4c659f2488d", // uniswap v2
    "0xe592427a0aece92de3edee1f18e0157c05861564", // uniswap v3
    "0x68b3465833fb72a70ecdf485e0e4c7bd8665fc45", // uniswap swaprouter02
    "0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad", // uniswap universal router
    "0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f", // sushiswap
    "0x1111111254eeb25477b68fb85ed929f73a960582", // 1inch v5
    "0xdef1c0ded9bec7f1a1670819833240f027b25eff", // 0x exchange proxy
    "0x10ed43c718714eb63d5aa57b78b54704e256024e", // pancakeswap v2
];

/// Well-known bridge entry points (lowercased).
pub const KNOWN_BRIDGES: &[&str] = &[
    "0x72ce9c846789fdb6fc1f34ac4ad25dd9ef7031ef", // arbitrum gateway router
    "0x4dbd4fc535ac27206064b68ffcf827b0a60bab3f", // arbitrum delayed inbox
    "0x99c9fc46f92e8a1c0dec1b1747d010903e884be1", // optimism standard bridge
    "0x49048044d57e1c92a77f79988d21fa8faf74e97e", // base portal
    "0xa0c68c638235ee32657e8f720a23cec1bfc77c77", // polygon root chain manager
    "0x32400084c286cf3e17e7b677ea9583e60a000324", // zksync era
    "0x8731d54e9d02c286767d56ac03e8037c07e01e98", // stargate router
    "0xb8901acb165ed027e32754e0ffe830802919727f", // hop
];

/// Qualification rules stored in an airdrop's `requirements` column.
///
/// Only the rules that are present are evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityRequirements {
    /// Any transaction touching one of these earns the points
    pub contract_interactions: Vec<String>,
    pub min_balance: Option<MinBalance>,
    /// Holding any NFT from one of these earns the points
    pub nft_contracts: Vec<String>,
    pub min_transactions: Option<u32>,
    pub requires_dex: bool,
    pub requires_bridge: bool,
    /// Additional routers counted as DEX usage
    pub extra_dex_routers: Vec<String>,
    /// Additional contracts counted as bridge usage
    pub extra_bridges: Vec<String>,
}

impl EligibilityRequirements {
    /// Parse the JSON requirements of an airdrop. Unknown keys are ignored.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
    }

    pub fn dex_routers(&self) -> HashSet<String> {
        address_set(KNOWN_DEX_ROUTERS.iter().copied(), &self.extra_dex_routers)
    }

    pub fn bridges(&self) -> HashSet<String> {
        address_set(KNOWN_BRIDGES.iter().copied(), &self.extra_bridges)
    }
}

fn address_set<'a>(builtin: impl Iterator<Item = &'a str>, extra: &[String]) -> HashSet<String> {
    builtin
        .map(str::to_string)
        .chain(extra.iter().map(|a| a.to_lowercase()))
        .collect()
}

/// Minimum holding of one asset.
///
/// The native asset is measured in whole units (ETH). ERC-20 amounts are raw
/// base units as reported by the provider, with no decimals scaling, so
/// 1 USDC is `1000000`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinBalance {
    /// Token contract; None means the native asset
    #[serde(default)]
    pub token: Option<String>,
    pub amount: f64,
}

/// Chain observations for one wallet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnChainObservations {
    pub transactions: Vec<ChainTransaction>,
    pub token_balances: Vec<TokenBalance>,
    pub nfts: Vec<NftHolding>,
}

/// One evaluated rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub met: bool,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityScore {
    /// 0-100
    pub score: u32,
    pub is_eligible: bool,
    pub criteria: Vec<Criterion>,
}

fn criterion(name: &str, met: bool, points: u32) -> Criterion {
    Criterion {
        name: name.to_string(),
        met,
        points: if met { points } else { 0 },
    }
}

fn touches_any(transactions: &[ChainTransaction], targets: &HashSet<String>) -> bool {
    transactions.iter().any(|tx| {
        tx.to
            .as_deref()
            .is_some_and(|to| targets.contains(&to.to_lowercase()))
    })
}

/// Score a wallet's observations against an airdrop's requirements.
pub fn score_eligibility(
    requirements: &EligibilityRequirements,
    observations: &OnChainObservations,
) -> EligibilityScore {
    let mut criteria = Vec::new();

    if !requirements.contract_interactions.is_empty() {
        let targets = address_set(std::iter::empty(), &requirements.contract_interactions);
        let met = touches_any(&observations.transactions, &targets);
        criteria.push(criterion(
            "contract_interaction",
            met,
            POINTS_CONTRACT_INTERACTION,
        ));
    }

    if let Some(min) = &requirements.min_balance {
        let wanted = min.token.as_ref().map(|t| t.to_lowercase());
        let met = observations.token_balances.iter().any(|b| {
            b.contract_address.as_ref().map(|c| c.to_lowercase()) == wanted && b.amount >= min.amount
        });
        criteria.push(criterion("min_balance", met, POINTS_MIN_BALANCE));
    }

    if !requirements.nft_contracts.is_empty() {
        let targets = address_set(std::iter::empty(), &requirements.nft_contracts);
        let met = observations
            .nfts
            .iter()
            .any(|nft| targets.contains(&nft.contract_address.to_lowercase()));
        criteria.push(criterion("nft_holding", met, POINTS_NFT));
    }

    if let Some(min) = requirements.min_transactions {
        let met = observations.transactions.len() >= min as usize;
        criteria.push(criterion("min_transactions", met, POINTS_MIN_TRANSACTIONS));
    }

    if requirements.requires_dex {
        let met = touches_any(&observations.transactions, &requirements.dex_routers());
        criteria.push(criterion("dex_usage", met, POINTS_DEX));
    }

    if requirements.requires_bridge {
        let met = touches_any(&observations.transactions, &requirements.bridges());
        criteria.push(criterion("bridge_usage", met, POINTS_BRIDGE));
    }

    let score = criteria.iter().map(|c| c.points).sum::<u32>().min(100);

    EligibilityScore {
        score,
        is_eligible: score >= ELIGIBILITY_THRESHOLD,
        criteria,
    }
}
