//! Payment provider (Stripe-compatible): checkout sessions, refunds and
//! webhook signature verification.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

type HmacSha256 = Hmac<Sha256>;

const PROVIDER: &str = "payments";

/// Parameters for a hosted checkout page.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Our campaign id, echoed back in webhooks
    pub reference_id: String,
    pub description: String,
    pub amount_cents: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted checkout page
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundReceipt {
    pub id: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync + std::fmt::Debug {
    async fn create_checkout_session(&self, request: &CheckoutRequest)
        -> CoreResult<CheckoutSession>;

    /// Refund the full amount of a payment intent.
    async fn refund(&self, payment_intent_id: &str) -> CoreResult<RefundReceipt>;
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        }
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> CoreResult<T> {
        if self.secret_key.is_empty() {
            return Err(CoreError::provider(PROVIDER, "secret key not configured"));
        }

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(%url, "payment provider request");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("request rejected");
            return Err(CoreError::provider(PROVIDER, format!("{status}: {message}")));
        }
        serde_json::from_value(body).map_err(|e| CoreError::provider(PROVIDER, e.to_string()))
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> CoreResult<CheckoutSession> {
        let form = [
            ("mode", "payment".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("client_reference_id", request.reference_id.clone()),
            ("metadata[campaign_id]", request.reference_id.clone()),
            (
                "payment_intent_data[metadata][campaign_id]",
                request.reference_id.clone(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", request.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                request.description.clone(),
            ),
        ];
        self.post_form("/v1/checkout/sessions", &form).await
    }

    async fn refund(&self, payment_intent_id: &str) -> CoreResult<RefundReceipt> {
        self.post_form(
            "/v1/refunds",
            &[("payment_intent", payment_intent_id.to_string())],
        )
        .await
    }
}

// ============================================================================
// Webhooks
// ============================================================================

/// An event delivered to the webhook endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> CoreResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| CoreError::validation("payload", format!("malformed event: {e}")))
    }

    /// `id` of the event's object (session, intent or charge).
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(Value::as_str)
    }

    /// Payment intent id referenced by the object, or the object itself if it is one.
    pub fn payment_intent(&self) -> Option<&str> {
        match self.data.object.get("object").and_then(Value::as_str) {
            Some("payment_intent") => self.object_id(),
            _ => self.data.object.get("payment_intent").and_then(Value::as_str),
        }
    }

    /// Campaign id we attached when creating the checkout session.
    pub fn campaign_reference(&self) -> Option<&str> {
        let object = &self.data.object;
        object
            .pointer("/metadata/campaign_id")
            .or_else(|| object.get("client_reference_id"))
            .and_then(Value::as_str)
    }
}

fn signature_error(message: &str) -> CoreError {
    CoreError::validation("Stripe-Signature", message)
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`).
///
/// The signed payload is `"{t}.{body}"` under HMAC-SHA256 with the shared
/// secret; `t` must be within `tolerance_secs` of `now`.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> CoreResult<()> {
    if secret.is_empty() {
        return Err(CoreError::provider(PROVIDER, "webhook secret not configured"));
    }

    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| signature_error("missing timestamp"))?;
    if candidates.is_empty() {
        return Err(signature_error("missing v1 signature"));
    }
    let skew = now.checked_sub(timestamp).map(i64::unsigned_abs);
    let tolerance = u64::try_from(tolerance_secs).unwrap_or(0);
    match skew {
        Some(skew) if skew <= tolerance => {}
        _ => return Err(signature_error("timestamp outside tolerance")),
    }

    let matches = candidates.iter().any(|candidate| {
        let Ok(expected) = hex::decode(candidate) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    });

    if matches {
        Ok(())
    } else {
        Err(signature_error("signature mismatch"))
    }
}

/// Build a signature header; used by tests and local tooling.
pub fn sign_webhook_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}
