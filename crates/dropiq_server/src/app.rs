//! Axum application builder.

use std::time::Duration;

use axum::{
    http::HeaderValue,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::routes::{
    admin, airdrops, auth, automation, blacklist, campaigns, health, security, strategies, users,
    webhooks, ws,
};
use crate::state::AppState;

/// Create the Axum application with all routes.
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/ws", get(ws::ws_handler))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/wallet/nonce", post(auth::wallet_nonce))
        .route("/api/auth/wallet/verify", post(auth::wallet_verify))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/2fa/setup", post(auth::setup_two_factor))
        .route("/api/auth/2fa/enable", post(auth::enable_two_factor))
        .route("/api/auth/2fa/disable", post(auth::disable_two_factor))
        // Users
        .route("/api/users/me", get(users::get_me).patch(users::update_me))
        .route(
            "/api/users/me/wallets",
            get(users::list_wallets).post(users::add_wallet),
        )
        .route("/api/users/me/wallets/{id}", delete(users::remove_wallet))
        // Airdrops
        .route("/api/airdrops", get(airdrops::list).post(airdrops::submit))
        .route("/api/airdrops/recommended", get(airdrops::recommended))
        .route(
            "/api/airdrops/{id}",
            get(airdrops::get)
                .patch(airdrops::update)
                .delete(airdrops::delete),
        )
        .route("/api/airdrops/{id}/approve", post(airdrops::approve))
        .route("/api/airdrops/{id}/reject", post(airdrops::reject))
        .route("/api/airdrops/{id}/eligibility", post(airdrops::eligibility))
        .route("/api/airdrops/{id}/security", get(airdrops::security))
        // Security and activity
        .route("/api/security/analyze", post(security::analyze))
        .route("/api/activity/{address}", get(security::activity))
        // Campaigns
        .route("/api/campaigns", get(campaigns::list).post(campaigns::create))
        .route("/api/campaigns/{id}", get(campaigns::get))
        .route("/api/campaigns/{id}/approve", post(campaigns::approve))
        .route("/api/campaigns/{id}/reject", post(campaigns::reject))
        .route("/api/webhooks/payments", post(webhooks::payments))
        // Strategies
        .route(
            "/api/strategies",
            get(strategies::list).post(strategies::create),
        )
        .route(
            "/api/strategies/{id}",
            get(strategies::get)
                .patch(strategies::update)
                .delete(strategies::delete),
        )
        .route("/api/strategies/{id}/copy", post(strategies::copy))
        .route("/api/strategies/{id}/rate", post(strategies::rate))
        .route(
            "/api/strategies/{id}/comments",
            get(strategies::comments).post(strategies::add_comment),
        )
        .route(
            "/api/strategies/{id}/tips",
            get(strategies::tips).post(strategies::tip),
        )
        // Blacklist
        .route("/api/blacklist", get(blacklist::list).post(blacklist::add))
        .route("/api/blacklist/check", get(blacklist::check))
        .route("/api/blacklist/{id}", delete(blacklist::remove))
        // Automation
        .route(
            "/api/automation/tasks",
            get(automation::list).post(automation::create),
        )
        .route(
            "/api/automation/tasks/{id}",
            get(automation::get).delete(automation::delete),
        )
        .route("/api/automation/tasks/{id}/approve", post(automation::approve))
        .route("/api/automation/tasks/{id}/reject", post(automation::reject))
        .route(
            "/api/automation/tasks/{id}/status",
            patch(automation::update_status),
        )
        // Admin
        .route("/api/admin/alerts", post(admin::broadcast_alert))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/audit", get(admin::audit_log))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}
