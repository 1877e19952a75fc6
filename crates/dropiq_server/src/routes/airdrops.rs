//! Airdrop catalogue, moderation, and the per-airdrop scoring endpoints.

use axum::extract::{Path, State};
use dropiq_api::{
    AirdropPage, AirdropPatch, AirdropQuery, DeletedResponse, EligibilityReport,
    EligibilityRequest, NewAirdrop, Recommendation, RecommendedQuery, RejectAirdropRequest,
    SecurityReport,
};
use dropiq_db::Airdrop;

use super::{created, ok, ApiResult, CreatedResult};
use crate::extract::{AdminUser, ApiJson, ApiQuery, CurrentUser, OptionalUser};
use crate::state::AppState;

/// `GET /api/airdrops`. Anonymous callers and regular users only see approved entries.
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    ApiQuery(query): ApiQuery<AirdropQuery>,
) -> ApiResult<AirdropPage> {
    ok(state.airdrops.list(viewer.as_ref(), &query).await?)
}

pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NewAirdrop>,
) -> CreatedResult<Airdrop> {
    created(state.airdrops.submit(&user, &input).await?)
}

pub async fn get(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<String>,
) -> ApiResult<Airdrop> {
    ok(state.airdrops.get(viewer.as_ref(), &id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<AirdropPatch>,
) -> ApiResult<Airdrop> {
    ok(state.airdrops.update(&admin, &id, &patch).await?)
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    state.airdrops.delete(&admin, &id).await?;
    ok(DeletedResponse { deleted: true })
}

pub async fn approve(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Airdrop> {
    ok(state.airdrops.approve(&admin, &id).await?)
}

pub async fn reject(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RejectAirdropRequest>,
) -> ApiResult<Airdrop> {
    ok(state.airdrops.reject(&admin, &id, &req.reason).await?)
}

/// `POST /api/airdrops/{id}/eligibility`
pub async fn eligibility(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<EligibilityRequest>,
) -> ApiResult<EligibilityReport> {
    let report = state
        .eligibility
        .check(viewer.as_ref(), &id, &req.address, req.chain_id)
        .await?;
    ok(report)
}

/// `GET /api/airdrops/{id}/security`
pub async fn security(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<String>,
) -> ApiResult<SecurityReport> {
    ok(state.security.analyze_airdrop(viewer.as_ref(), &id).await?)
}

/// `GET /api/airdrops/recommended?address=`
pub async fn recommended(
    State(state): State<AppState>,
    _: CurrentUser,
    ApiQuery(query): ApiQuery<RecommendedQuery>,
) -> ApiResult<Vec<Recommendation>> {
    ok(state.activity.recommend(&query.address).await?)
}
