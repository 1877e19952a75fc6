//! Sign-up, sign-in (password and wallet) and two-factor management.

use axum::extract::State;
use dropiq_api::{
    AuthSession, EnabledResponse, LoginRequest, RegisterRequest, TotpCodeRequest,
    TwoFactorSetup, WalletChallenge, WalletNonceRequest, WalletVerifyRequest,
};
use dropiq_db::User;

use super::{created, ok, ApiResult, CreatedResult};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> CreatedResult<AuthSession> {
    let session = state
        .auth
        .register(&req.email, &req.password, req.display_name.as_deref())
        .await?;
    created(session)
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<AuthSession> {
    let session = state
        .auth
        .login(&req.email, &req.password, req.totp_code.as_deref())
        .await?;
    ok(session)
}

/// `POST /api/auth/wallet/nonce`
pub async fn wallet_nonce(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WalletNonceRequest>,
) -> ApiResult<WalletChallenge> {
    ok(state.auth.wallet_challenge(&req.address).await?)
}

/// `POST /api/auth/wallet/verify`
pub async fn wallet_verify(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WalletVerifyRequest>,
) -> ApiResult<AuthSession> {
    ok(state.auth.wallet_sign_in(&req.address, &req.signature).await?)
}

/// `GET /api/auth/me`
pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    ok(user)
}

pub async fn setup_two_factor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<TwoFactorSetup> {
    ok(state.auth.setup_two_factor(&user).await?)
}

pub async fn enable_two_factor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<TotpCodeRequest>,
) -> ApiResult<EnabledResponse> {
    let user = state.auth.enable_two_factor(&user, &req.code).await?;
    ok(EnabledResponse {
        enabled: user.two_factor_enabled,
    })
}

pub async fn disable_two_factor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<TotpCodeRequest>,
) -> ApiResult<EnabledResponse> {
    let user = state.auth.disable_two_factor(&user, &req.code).await?;
    ok(EnabledResponse {
        enabled: user.two_factor_enabled,
    })
}
