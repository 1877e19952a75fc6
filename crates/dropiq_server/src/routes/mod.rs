//! Route handlers.
//!
//! Every handler returns the [`ApiResponse`] envelope. Authentication comes
//! from the extractors in [`crate::extract`]; authorization beyond "signed in"
//! or "admin" lives in the core services.

pub mod admin;
pub mod airdrops;
pub mod auth;
pub mod automation;
pub mod blacklist;
pub mod campaigns;
pub mod health;
pub mod security;
pub mod strategies;
pub mod users;
pub mod webhooks;
pub mod ws;

use axum::http::StatusCode;
use dropiq_api::ApiResponse;

use crate::error::AppError;

pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;
pub type CreatedResult<T> = Result<(StatusCode, ApiResponse<T>), AppError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::ok(data))
}

pub(crate) fn created<T>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, ApiResponse::ok(data)))
}
