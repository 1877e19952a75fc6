//! Standalone security analysis and on-chain activity profiles.
//!
//! Both fan out to third-party providers, so they require a signed-in caller.

use axum::extract::{Path, State};
use dropiq_api::{ActivityProfile, ActivityQuery, SecurityReport, SecurityTarget};

use super::{ok, ApiResult};
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::state::AppState;

/// `POST /api/security/analyze`
pub async fn analyze(
    State(state): State<AppState>,
    _: CurrentUser,
    ApiJson(target): ApiJson<SecurityTarget>,
) -> ApiResult<SecurityReport> {
    ok(state.security.analyze(&target).await?)
}

/// `GET /api/activity/{address}?chain_id=`
pub async fn activity(
    State(state): State<AppState>,
    _: CurrentUser,
    Path(address): Path<String>,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> ApiResult<ActivityProfile> {
    ok(state.activity.profile(&address, query.chain_id).await?)
}
