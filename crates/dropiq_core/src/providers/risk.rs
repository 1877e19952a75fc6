//! Contract risk lookups against a GoPlus-compatible token security API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Risk flags reported for a token contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractRisk {
    pub is_honeypot: bool,
    pub selfdestruct: bool,
    pub hidden_owner: bool,
    pub can_take_back_ownership: bool,
    pub is_mintable: bool,
    pub is_proxy: bool,
    /// None when the API did not report it
    pub is_open_source: Option<bool>,
    /// Fractions, e.g. 0.05 for 5 %
    pub buy_tax: Option<f64>,
    pub sell_tax: Option<f64>,
}

impl ContractRisk {
    /// Highest of buy and sell tax.
    pub fn max_tax(&self) -> Option<f64> {
        match (self.buy_tax, self.sell_tax) {
            (Some(b), Some(s)) => Some(b.max(s)),
            (b, s) => b.or(s),
        }
    }
}

#[async_trait]
pub trait ContractRiskProvider: Send + Sync + std::fmt::Debug {
    /// Look up a contract. `Ok(None)` means the API has no data for it.
    async fn token_security(&self, chain_id: u64, address: &str)
        -> CoreResult<Option<ContractRisk>>;
}

#[derive(Debug, Clone)]
pub struct GoPlusClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoPlusClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

/// GoPlus encodes flags as "0"/"1" strings.
fn flag(entry: &Value, key: &str) -> Option<bool> {
    match entry.get(key)?.as_str()? {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

fn number(entry: &Value, key: &str) -> Option<f64> {
    entry.get(key)?.as_str()?.parse().ok()
}

pub(crate) fn parse_token_security(entry: &Value) -> ContractRisk {
    ContractRisk {
        is_honeypot: flag(entry, "is_honeypot").unwrap_or(false),
        selfdestruct: flag(entry, "selfdestruct").unwrap_or(false),
        hidden_owner: flag(entry, "hidden_owner").unwrap_or(false),
        can_take_back_ownership: flag(entry, "can_take_back_ownership").unwrap_or(false),
        is_mintable: flag(entry, "is_mintable").unwrap_or(false),
        is_proxy: flag(entry, "is_proxy").unwrap_or(false),
        is_open_source: flag(entry, "is_open_source"),
        buy_tax: number(entry, "buy_tax"),
        sell_tax: number(entry, "sell_tax"),
    }
}

#[async_trait]
impl ContractRiskProvider for GoPlusClient {
    async fn token_security(
        &self,
        chain_id: u64,
        address: &str,
    ) -> CoreResult<Option<ContractRisk>> {
        let address = address.to_lowercase();
        let url = format!(
            "{}/api/v1/token_security/{}",
            self.base_url.trim_end_matches('/'),
            chain_id
        );
        debug!(chain_id, %address, "token security lookup");

        let response: Value = self
            .http
            .get(url)
            .query(&[("contract_addresses", address.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.get("code").and_then(Value::as_i64) != Some(1) {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(CoreError::provider("risk api", message.to_string()));
        }

        Ok(response
            .get("result")
            .and_then(|r| r.get(&address))
            .map(parse_token_security))
    }
}
