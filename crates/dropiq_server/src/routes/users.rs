//! The signed-in user's profile and linked wallets.

use axum::extract::{Path, State};
use dropiq_api::{DeletedResponse, NewWallet, ProfileUpdate};
use dropiq_db::{User, Wallet};

use super::{created, ok, ApiResult, CreatedResult};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub async fn get_me(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    ok(user)
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<User> {
    ok(state.profiles.update(&user, &update).await?)
}

pub async fn list_wallets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<Wallet>> {
    ok(state.profiles.wallets(&user).await?)
}

pub async fn add_wallet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NewWallet>,
) -> CreatedResult<Wallet> {
    created(state.profiles.add_wallet(&user, &input).await?)
}

pub async fn remove_wallet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(wallet_id): Path<String>,
) -> ApiResult<DeletedResponse> {
    state.profiles.remove_wallet(&user, &wallet_id).await?;
    ok(DeletedResponse { deleted: true })
}
