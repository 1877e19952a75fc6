//! Router harness: in-memory database, fake providers, `oneshot` requests.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use dropiq_core::{
    config::ChainsConfig,
    providers::{
        http_client, ChainDataProvider, ChainTransaction, CheckoutRequest, CheckoutSession,
        ContractRisk, ContractRiskProvider, NftHolding, PaymentProvider, RefundReceipt,
        TokenBalance,
    },
    CoreResult, DropiqConfig, ProviderRegistry,
};
use dropiq_db::DropiqDb;
use dropiq_server::{create_app, AppState, Providers};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_test";

#[derive(Debug, Default)]
pub struct FakeChain;

#[async_trait]
impl ChainDataProvider for FakeChain {
    fn chain_id(&self) -> u64 {
        1
    }

    async fn transactions(&self, _address: &str) -> CoreResult<Vec<ChainTransaction>> {
        Ok(Vec::new())
    }

    async fn token_balances(&self, _address: &str) -> CoreResult<Vec<TokenBalance>> {
        Ok(Vec::new())
    }

    async fn nfts(&self, _address: &str) -> CoreResult<Vec<NftHolding>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Default)]
pub struct FakeRisk;

#[async_trait]
impl ContractRiskProvider for FakeRisk {
    async fn token_security(&self, _chain_id: u64, _address: &str) -> CoreResult<Option<ContractRisk>> {
        Ok(None)
    }
}

#[derive(Debug, Default)]
pub struct FakePayments {
    sessions: AtomicUsize,
    refunds: Mutex<Vec<String>>,
}

impl FakePayments {
    pub fn refund_calls(&self) -> Vec<String> {
        self.refunds.lock().clone()
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> CoreResult<CheckoutSession> {
        let n = self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            id: format!("cs_test_{n}"),
            url: Some(format!("https://pay.example/{}", request.reference_id)),
        })
    }

    async fn refund(&self, payment_intent_id: &str) -> CoreResult<RefundReceipt> {
        self.refunds.lock().push(payment_intent_id.to_string());
        Ok(RefundReceipt {
            id: format!("re_{payment_intent_id}"),
            status: "succeeded".to_string(),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub payments: Arc<FakePayments>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut config = DropiqConfig::default();
        config.payments.webhook_secret = WEBHOOK_SECRET.to_string();

        let db = DropiqDb::open_in_memory().await.unwrap();
        let chains = ProviderRegistry::new(http_client(5).unwrap(), &ChainsConfig::default());
        chains.insert(Arc::new(FakeChain));
        let payments = Arc::new(FakePayments::default());
        let providers = Providers {
            chains,
            risk: Arc::new(FakeRisk),
            payments: payments.clone(),
        };

        let state = AppState::with_providers(config, db, providers);
        Self {
            router: create_app(state.clone()),
            state,
            payments,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register an account and return its bearer token.
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                serde_json::json!({ "email": email, "password": "correct horse battery" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Register an account and grant it the admin role.
    pub async fn register_admin(&self, email: &str) -> String {
        let token = self.register(email).await;
        self.state.auth.promote_admin(email).await.unwrap();
        token
    }
}
