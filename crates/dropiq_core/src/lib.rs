//! DropIQ Core - airdrop discovery and vetting
//!
//! This crate holds the domain logic behind the DropIQ API: the scoring
//! heuristics for eligibility, security and personalization, the clients
//! for chain data, contract risk and payment providers, and the services
//! that combine them with the database.

pub mod activity;
pub mod config;
pub mod error;
pub mod providers;
pub mod scoring;
pub mod services;

#[cfg(test)]
mod test_support;

pub use activity::{rank_airdrops, ActivityPatternAnalyzer, ActivityProfile, Recommendation};
pub use config::{load_config, DropiqConfig};
pub use error::{ConfigError, CoreError, CoreResult};
pub use providers::{
    ChainDataProvider, ContractRiskProvider, GoPlusClient, PaymentProvider, ProviderRegistry,
    StripeClient,
};
pub use scoring::{EligibilityScore, RiskLevel, SecurityScore};
