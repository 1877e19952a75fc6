//! Community strategies: authoring, copying, ratings, comments and tips.

use axum::extract::{Path, State};
use dropiq_api::{
    DeletedResponse, NewComment, NewStrategy, NewTip, RateRequest, StrategyPatch, StrategyQuery,
};
use dropiq_db::{Strategy, StrategyComment, StrategyTip};

use super::{created, ok, ApiResult, CreatedResult};
use crate::extract::{ApiJson, ApiQuery, CurrentUser, OptionalUser};
use crate::state::AppState;

/// `GET /api/strategies`. Public strategies, plus the caller's private ones.
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    ApiQuery(query): ApiQuery<StrategyQuery>,
) -> ApiResult<Vec<Strategy>> {
    ok(state.strategies.list(viewer.as_ref(), &query).await?)
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NewStrategy>,
) -> CreatedResult<Strategy> {
    created(state.strategies.create(&user, &input).await?)
}

pub async fn get(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<String>,
) -> ApiResult<Strategy> {
    ok(state.strategies.get(viewer.as_ref(), &id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<StrategyPatch>,
) -> ApiResult<Strategy> {
    ok(state.strategies.update(&user, &id, &patch).await?)
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    state.strategies.delete(&user, &id).await?;
    ok(DeletedResponse { deleted: true })
}

pub async fn copy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> CreatedResult<Strategy> {
    created(state.strategies.copy(&user, &id).await?)
}

pub async fn rate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RateRequest>,
) -> ApiResult<Strategy> {
    ok(state.strategies.rate(&user, &id, req.rating).await?)
}

pub async fn comments(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<StrategyComment>> {
    ok(state.strategies.comments(viewer.as_ref(), &id).await?)
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<NewComment>,
) -> CreatedResult<StrategyComment> {
    created(state.strategies.add_comment(&user, &id, &input).await?)
}

pub async fn tips(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<StrategyTip>> {
    ok(state.strategies.tips(viewer.as_ref(), &id).await?)
}

pub async fn tip(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<NewTip>,
) -> CreatedResult<StrategyTip> {
    created(state.strategies.tip(&user, &id, &input).await?)
}
