//! Clients for third-party services.
//!
//! Each service sits behind a trait so services can be exercised with
//! in-process fakes; the concrete clients speak HTTP through `reqwest`.

pub mod chain;
pub mod payments;
pub mod risk;

pub use chain::{
    AlchemyProvider, ChainDataProvider, ChainTransaction, NftHolding, ProviderRegistry,
    TokenBalance,
};
pub use payments::{
    sign_webhook_payload, verify_webhook_signature, CheckoutRequest, CheckoutSession, PaymentProvider, RefundReceipt,
    StripeClient, WebhookEvent,
};
pub use risk::{ContractRisk, ContractRiskProvider, GoPlusClient};

use std::time::Duration;

use crate::error::CoreResult;

/// Shared HTTP client for outbound provider calls.
pub fn http_client(timeout_secs: u64) -> CoreResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("dropiq/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(5))
        .build()?;
    Ok(client)
}
