//! Queued on-chain tasks and their approval gate.

use axum::extract::{Path, State};
use dropiq_api::{DeletedResponse, NewTask, StatusUpdate, TaskListQuery};
use dropiq_db::AutomatedTask;

use super::{created, ok, ApiResult, CreatedResult};
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<Vec<AutomatedTask>> {
    ok(state.automation.list(&user, query.status).await?)
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NewTask>,
) -> CreatedResult<AutomatedTask> {
    created(state.automation.create(&user, &input).await?)
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<AutomatedTask> {
    ok(state.automation.get(&user, &id).await?)
}

pub async fn approve(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<AutomatedTask> {
    ok(state.automation.approve(&user, &id).await?)
}

pub async fn reject(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<AutomatedTask> {
    ok(state.automation.reject(&user, &id).await?)
}

pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<AutomatedTask> {
    ok(state.automation.update_status(&user, &id, &update).await?)
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    state.automation.delete(&user, &id).await?;
    ok(DeletedResponse { deleted: true })
}
