//! Known-bad domains and contract addresses.

use axum::extract::{Path, State};
use dropiq_api::{
    BlacklistCheck, BlacklistCheckQuery, BlacklistListQuery, DeletedResponse, NewBlacklistEntry,
};
use dropiq_db::BlacklistEntry;

use super::{created, ok, ApiResult, CreatedResult};
use crate::extract::{AdminUser, ApiJson, ApiQuery};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiQuery(query): ApiQuery<BlacklistListQuery>,
) -> ApiResult<Vec<BlacklistEntry>> {
    ok(state.blacklist.list(&admin, query.entry_type).await?)
}

pub async fn add(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(input): ApiJson<NewBlacklistEntry>,
) -> CreatedResult<BlacklistEntry> {
    created(state.blacklist.add(&admin, &input).await?)
}

pub async fn remove(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    state.blacklist.remove(&admin, &id).await?;
    ok(DeletedResponse { deleted: true })
}

/// `GET /api/blacklist/check?value=` (public)
pub async fn check(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BlacklistCheckQuery>,
) -> ApiResult<BlacklistCheck> {
    ok(state.blacklist.check(&query.value).await?)
}
