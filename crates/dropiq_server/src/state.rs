//! Application state

use std::sync::Arc;

use dropiq_core::{
    providers::http_client,
    services::{
        ActivityService, AirdropService, AlertHub, AuthService, AutomationService,
        BlacklistService, CampaignService, EligibilityChecker, ProfileService, SecurityAnalyzer,
        StrategyService,
    },
    ContractRiskProvider, DropiqConfig, GoPlusClient, PaymentProvider, ProviderRegistry,
    StripeClient,
};
use dropiq_db::DropiqDb;

use crate::error::ServerResult;

/// Outbound clients the services talk to.
#[derive(Clone)]
pub struct Providers {
    pub chains: ProviderRegistry,
    pub risk: Arc<dyn ContractRiskProvider>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl Providers {
    /// Build the HTTP-backed clients described by the configuration.
    pub fn from_config(config: &DropiqConfig) -> ServerResult<Self> {
        let http = http_client(config.chains.request_timeout_secs)?;
        Ok(Self {
            chains: ProviderRegistry::new(http.clone(), &config.chains),
            risk: Arc::new(GoPlusClient::new(http.clone(), &config.security.risk_api_url)),
            payments: Arc::new(StripeClient::new(
                http,
                &config.payments.api_base_url,
                &config.payments.secret_key,
            )),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DropiqConfig>,
    pub db: DropiqDb,
    pub auth: AuthService,
    pub profiles: ProfileService,
    pub airdrops: AirdropService,
    pub eligibility: EligibilityChecker,
    pub security: SecurityAnalyzer,
    pub activity: ActivityService,
    pub campaigns: CampaignService,
    pub strategies: StrategyService,
    pub blacklist: BlacklistService,
    pub automation: AutomationService,
    pub alerts: AlertHub,
}

impl AppState {
    /// Open the database and construct every service from configuration.
    pub async fn new(config: DropiqConfig) -> ServerResult<Self> {
        config.validate()?;
        let db = DropiqDb::open(&config.database.path).await?;
        let providers = Providers::from_config(&config)?;
        Ok(Self::with_providers(config, db, providers))
    }

    /// Wire services over an open database and an explicit set of providers.
    pub fn with_providers(config: DropiqConfig, db: DropiqDb, providers: Providers) -> Self {
        Self {
            auth: AuthService::new(db.clone(), &config.auth),
            profiles: ProfileService::new(db.clone()),
            airdrops: AirdropService::new(db.clone()),
            eligibility: EligibilityChecker::new(db.clone(), providers.chains.clone()),
            security: SecurityAnalyzer::new(
                db.clone(),
                providers.risk,
                config.security.popular_domains.clone(),
            ),
            activity: ActivityService::new(db.clone(), providers.chains),
            campaigns: CampaignService::new(db.clone(), providers.payments, config.payments.clone()),
            strategies: StrategyService::new(db.clone()),
            blacklist: BlacklistService::new(db.clone()),
            automation: AutomationService::new(db.clone()),
            alerts: AlertHub::new(),
            config: Arc::new(config),
            db,
        }
    }
}
