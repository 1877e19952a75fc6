//! Fixtures and in-process fakes shared by the service tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dropiq_db::{queries, Airdrop, AirdropStatus, DropiqDb, Json, User, UserRole};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::providers::{
    ChainDataProvider, ChainTransaction, CheckoutRequest, CheckoutSession, ContractRisk,
    ContractRiskProvider, NftHolding, PaymentProvider, RefundReceipt, TokenBalance,
};

pub async fn test_db() -> DropiqDb {
    DropiqDb::open_in_memory().await.unwrap()
}

/// Sign `message` with a raw secret key, returning `(address, signature)`.
pub fn sign_message(secret: [u8; 32], message: &str) -> (String, String) {
    dropiq_auth::wallet::testing::personal_sign(secret, message)
}

pub async fn create_user(db: &DropiqDb, email: &str, role: UserRole) -> User {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: Some(email.to_lowercase()),
        password_hash: None,
        display_name: Some(email.split('@').next().unwrap_or(email).to_string()),
        bio: None,
        avatar_url: None,
        role,
        two_factor_secret: None,
        two_factor_enabled: false,
        created_at: now,
        updated_at: now,
    };
    queries::create_user(db.pool(), &user).await.unwrap();
    user
}

/// Insert an airdrop directly, bypassing moderation.
pub async fn create_airdrop(
    db: &DropiqDb,
    name: &str,
    status: AirdropStatus,
    requirements: serde_json::Value,
) -> Airdrop {
    let now = Utc::now();
    let slug = crate::services::airdrop::slugify(name);
    let airdrop = Airdrop {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        project_url: Some(format!("https://{slug}.xyz")),
        slug,
        description: None,
        contract_address: None,
        chain_id: 1,
        category: None,
        status,
        requirements: Json(requirements),
        estimated_value_usd: None,
        deadline: None,
        submitted_by: None,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    };
    queries::create_airdrop(db.pool(), &airdrop).await.unwrap();
    airdrop
}

fn fake_failure(what: &str) -> CoreError {
    CoreError::provider("fake", format!("{what} unavailable"))
}

#[derive(Debug, Default)]
pub struct FakeChain {
    pub chain_id: u64,
    pub transactions: Vec<ChainTransaction>,
    pub balances: Vec<TokenBalance>,
    pub nfts: Vec<NftHolding>,
    pub fail_transactions: bool,
    pub fail_balances: bool,
    pub fail_nfts: bool,
}

impl FakeChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChainDataProvider for FakeChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn transactions(&self, _address: &str) -> CoreResult<Vec<ChainTransaction>> {
        if self.fail_transactions {
            return Err(fake_failure("transactions"));
        }
        Ok(self.transactions.clone())
    }

    async fn token_balances(&self, _address: &str) -> CoreResult<Vec<TokenBalance>> {
        if self.fail_balances {
            return Err(fake_failure("balances"));
        }
        Ok(self.balances.clone())
    }

    async fn nfts(&self, _address: &str) -> CoreResult<Vec<NftHolding>> {
        if self.fail_nfts {
            return Err(fake_failure("nfts"));
        }
        Ok(self.nfts.clone())
    }
}

#[derive(Debug, Default)]
pub struct FakeRisk {
    pub risk: Option<ContractRisk>,
    pub fail: bool,
}

#[async_trait]
impl ContractRiskProvider for FakeRisk {
    async fn token_security(
        &self,
        _chain_id: u64,
        _address: &str,
    ) -> CoreResult<Option<ContractRisk>> {
        if self.fail {
            return Err(fake_failure("risk api"));
        }
        Ok(self.risk.clone())
    }
}

#[derive(Debug, Default)]
pub struct FakePayments {
    pub sessions: AtomicUsize,
    pub refunds: Mutex<Vec<String>>,
    pub fail_checkout: bool,
    pub fail_refund: bool,
}

impl FakePayments {
    pub fn refund_calls(&self) -> Vec<String> {
        self.refunds.lock().clone()
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> CoreResult<CheckoutSession> {
        if self.fail_checkout {
            return Err(fake_failure("checkout"));
        }
        let n = self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            id: format!("cs_test_{n}"),
            url: Some(format!("https://pay.example/{}", request.reference_id)),
        })
    }

    async fn refund(&self, payment_intent_id: &str) -> CoreResult<RefundReceipt> {
        self.refunds.lock().push(payment_intent_id.to_string());
        if self.fail_refund {
            return Err(fake_failure("refund"));
        }
        Ok(RefundReceipt {
            id: format!("re_{payment_intent_id}"),
            status: "succeeded".to_string(),
        })
    }
}
