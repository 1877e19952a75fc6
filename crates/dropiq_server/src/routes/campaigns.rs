//! Sponsored campaigns: paid placement with admin review.

use axum::extract::{Path, State};
use dropiq_api::{CampaignListQuery, CreatedCampaign, NewCampaign, RejectCampaignRequest};
use dropiq_db::Campaign;

use super::{created, ok, ApiResult, CreatedResult};
use crate::extract::{AdminUser, ApiJson, ApiQuery, CurrentUser};
use crate::state::AppState;

/// `POST /api/campaigns`. Opens a checkout session, then stores the campaign.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NewCampaign>,
) -> CreatedResult<CreatedCampaign> {
    created(state.campaigns.create(&user, &input).await?)
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<CampaignListQuery>,
) -> ApiResult<Vec<Campaign>> {
    ok(state.campaigns.list(&user, query.status).await?)
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Campaign> {
    ok(state.campaigns.get(&user, &id).await?)
}

pub async fn approve(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Campaign> {
    ok(state.campaigns.approve(&admin, &id).await?)
}

pub async fn reject(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RejectCampaignRequest>,
) -> ApiResult<Campaign> {
    let campaign = state
        .campaigns
        .reject(&admin, &id, req.reason.as_deref(), req.refund)
        .await?;
    ok(campaign)
}
