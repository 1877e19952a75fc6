//! On-chain data: transactions, balances and NFT holdings per wallet.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{ChainProviderConfig, ChainsConfig};
use crate::error::{CoreError, CoreResult};

/// A transfer or call made by a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainTransaction {
    pub hash: String,
    pub from: String,
    /// Recipient or called contract; None for contract creation
    pub to: Option<String>,
    /// Native value moved, in whole units
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub chain_id: u64,
}

/// Balance of one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Token contract, None for the native asset
    pub contract_address: Option<String>,
    /// Native balances are in whole units; ERC-20 balances are raw base units
    pub amount: f64,
}

/// One NFT held by a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftHolding {
    pub contract_address: String,
    pub token_id: String,
}

/// Source of per-wallet chain observations.
#[async_trait]
pub trait ChainDataProvider: Send + Sync + std::fmt::Debug {
    fn chain_id(&self) -> u64;

    async fn transactions(&self, address: &str) -> CoreResult<Vec<ChainTransaction>>;

    async fn token_balances(&self, address: &str) -> CoreResult<Vec<TokenBalance>>;

    async fn nfts(&self, address: &str) -> CoreResult<Vec<NftHolding>>;
}

// ============================================================================
// Alchemy-compatible client
// ============================================================================

/// JSON-RPC + NFT REST client for an Alchemy-compatible endpoint.
#[derive(Debug, Clone)]
pub struct AlchemyProvider {
    http: reqwest::Client,
    chain_id: u64,
    rpc_url: String,
    nft_api_url: Option<String>,
}

const PROVIDER: &str = "chain data";

impl AlchemyProvider {
    pub fn new(http: reqwest::Client, config: &ChainProviderConfig) -> Self {
        Self {
            http,
            chain_id: config.chain_id,
            rpc_url: config.rpc_url.clone(),
            nft_api_url: config.nft_api_url.clone(),
        }
    }

    async fn rpc(&self, method: &str, params: Value) -> CoreResult<Value> {
        debug!(chain_id = self.chain_id, method, "chain rpc call");
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let response: Value = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.get("error") {
            return Err(CoreError::provider(PROVIDER, format!("{method}: {error}")));
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| CoreError::provider(PROVIDER, format!("{method}: missing result")))
    }
}

/// Parse a `0x` hex quantity. Values beyond u128 saturate.
fn parse_hex_quantity(raw: &str) -> Option<u128> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.is_empty() {
        return Some(0);
    }
    let trimmed = digits.trim_start_matches('0');
    if trimmed.len() > 32 {
        return Some(u128::MAX);
    }
    u128::from_str_radix(if trimmed.is_empty() { "0" } else { trimmed }, 16).ok()
}

#[async_trait]
impl ChainDataProvider for AlchemyProvider {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn transactions(&self, address: &str) -> CoreResult<Vec<ChainTransaction>> {
        let result = self
            .rpc(
                "alchemy_getAssetTransfers",
                json!([{
                    "fromBlock": "0x0",
                    "toBlock": "latest",
                    "fromAddress": address,
                    "category": ["external", "erc20", "erc721", "erc1155"],
                    "withMetadata": true,
                    "excludeZeroValue": false,
                    "maxCount": "0x3e8",
                }]),
            )
            .await?;

        let transfers = result
            .get("transfers")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(transfers
            .iter()
            .filter_map(|t| {
                Some(ChainTransaction {
                    hash: t.get("hash")?.as_str()?.to_string(),
                    from: t.get("from")?.as_str()?.to_lowercase(),
                    to: t.get("to").and_then(Value::as_str).map(str::to_lowercase),
                    value: t.get("value").and_then(Value::as_f64).unwrap_or(0.0),
                    timestamp: t
                        .pointer("/metadata/blockTimestamp")
                        .and_then(Value::as_str)
                        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                        .map(|ts| ts.with_timezone(&Utc)),
                    chain_id: self.chain_id,
                })
            })
            .collect())
    }

    async fn token_balances(&self, address: &str) -> CoreResult<Vec<TokenBalance>> {
        let native = self.rpc("eth_getBalance", json!([address, "latest"])).await?;
        let wei = native.as_str().and_then(parse_hex_quantity).unwrap_or(0);
        let mut balances = vec![TokenBalance {
            contract_address: None,
            amount: wei as f64 / 1e18,
        }];

        let tokens = self
            .rpc("alchemy_getTokenBalances", json!([address, "erc20"]))
            .await?;
        if let Some(list) = tokens.get("tokenBalances").and_then(Value::as_array) {
            balances.extend(list.iter().filter_map(|b| {
                let contract = b.get("contractAddress")?.as_str()?.to_lowercase();
                let raw = b.get("tokenBalance")?.as_str().and_then(parse_hex_quantity)?;
                Some(TokenBalance {
                    contract_address: Some(contract),
                    amount: raw as f64,
                })
            }));
        }
        Ok(balances)
    }

    async fn nfts(&self, address: &str) -> CoreResult<Vec<NftHolding>> {
        let Some(base) = &self.nft_api_url else {
            return Err(CoreError::provider(
                PROVIDER,
                format!("no NFT API configured for chain {}", self.chain_id),
            ));
        };

        let url = format!("{}/getNFTsForOwner", base.trim_end_matches('/'));
        let response: Value = self
            .http
            .get(url)
            .query(&[("owner", address), ("withMetadata", "false")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .get("ownedNfts")
            .and_then(Value::as_array)
            .map(|nfts| {
                nfts.iter()
                    .filter_map(|nft| {
                        Some(NftHolding {
                            contract_address: nft.pointer("/contract/address")?.as_str()?.to_lowercase(),
                            token_id: nft.get("tokenId")?.as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Chain data clients keyed by chain id, built on first use.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    http: reqwest::Client,
    configs: Arc<Vec<ChainProviderConfig>>,
    providers: Arc<DashMap<u64, Arc<dyn ChainDataProvider>>>,
}

impl ProviderRegistry {
    pub fn new(http: reqwest::Client, config: &ChainsConfig) -> Self {
        Self {
            http,
            configs: Arc::new(config.providers.clone()),
            providers: Arc::new(DashMap::new()),
        }
    }

    /// Register a provider directly, replacing any cached one for its chain.
    pub fn insert(&self, provider: Arc<dyn ChainDataProvider>) {
        self.providers.insert(provider.chain_id(), provider);
    }

    /// Provider for a chain, constructing it from configuration if needed.
    pub fn get(&self, chain_id: u64) -> CoreResult<Arc<dyn ChainDataProvider>> {
        if let Some(provider) = self.providers.get(&chain_id) {
            return Ok(provider.clone());
        }

        let config = self
            .configs
            .iter()
            .find(|c| c.chain_id == chain_id)
            .ok_or_else(|| {
                CoreError::validation("chain_id", format!("unsupported chain {chain_id}"))
            })?;

        debug!(chain_id, "creating chain data provider");
        let provider: Arc<dyn ChainDataProvider> =
            Arc::new(AlchemyProvider::new(self.http.clone(), config));
        Ok(self
            .providers
            .entry(chain_id)
            .or_insert(provider)
            .value()
            .clone())
    }

    /// Every chain id that has a provider configured or registered.
    pub fn chain_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .configs
            .iter()
            .map(|c| c.chain_id)
            .chain(self.providers.iter().map(|p| *p.key()))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
