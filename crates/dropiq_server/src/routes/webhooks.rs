//! Payment provider callbacks.

use axum::{body::Bytes, extract::State, http::HeaderMap};
use dropiq_api::WebhookOutcome;

use super::{ok, ApiResult};
use crate::error::AppError;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// `POST /api/webhooks/payments`
///
/// The body is taken raw because the signature covers the exact bytes sent.
/// Unknown event types are acknowledged so the provider stops retrying.
pub async fn payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<WebhookOutcome> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::bad_request("missing Stripe-Signature header"))?;
    ok(state.campaigns.handle_webhook(&body, signature).await?)
}
