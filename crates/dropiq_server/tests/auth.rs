mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use dropiq_auth::wallet::testing::personal_sign;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let app = TestApp::new().await;
    let payload = json!({ "email": "ann@example.com", "password": "correct horse battery" });

    let (status, body) = app.post("/api/auth/register", None, payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["user"].get("password_hash").is_none());

    let (status, body) = app.post("/api/auth/register", None, payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "not-an-email", "password": "correct horse battery" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("email"));

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "ann@example.com", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_uses_envelope() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post("/api/auth/login", None, json!({ "email": "ann@example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new().await;
    app.register("ann@example.com").await;

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ann@example.com", "password": "wrong password!" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ann@example.com", "password": "correct horse battery" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ann@example.com");
}

#[tokio::test]
async fn test_missing_or_bad_token() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/users/me", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A bad token on a public route is still rejected
    let (status, _) = app.get("/api/airdrops", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wallet_sign_in_nonce_is_single_use() {
    let app = TestApp::new().await;
    let secret = [7u8; 32];
    let (address, _) = personal_sign(secret, "hello");

    let (status, body) = app
        .post("/api/auth/wallet/nonce", None, json!({ "address": address }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let message = body["data"]["message"].as_str().unwrap().to_string();
    let (_, signature) = personal_sign(secret, &message);

    let verify = json!({ "address": address, "signature": signature });
    let (status, body) = app.post("/api/auth/wallet/verify", None, verify.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["user"]["email"].is_null());

    let (status, _) = app.post("/api/auth/wallet/verify", None, verify).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_and_wallets() {
    let app = TestApp::new().await;
    let token = app.register("ann@example.com").await;

    let (status, body) = app
        .request(
            Method::PATCH,
            "/api/users/me",
            Some(&token),
            Some(json!({ "display_name": "Ann", "bio": "farming" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["display_name"], "Ann");

    let wallet = json!({ "address": "0x00000000000000000000000000000000000000aa" });
    let (status, body) = app
        .post("/api/users/me/wallets", Some(&token), wallet.clone())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let wallet_id = body["data"]["id"].as_str().unwrap().to_string();

    let other = app.register("bob@example.com").await;
    let (status, _) = app.post("/api/users/me/wallets", Some(&other), wallet).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/users/me/wallets/{wallet_id}"),
            Some(&other),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/users/me/wallets", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ws_requires_token() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/ws", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/ws?token=bogus", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_authenticates_before_upgrade() {
    let app = TestApp::new().await;
    let token = app.register("ann@example.com").await;
    // Authenticated, but a plain GET is not an upgrade request
    let (status, _) = app.get(&format!("/ws?token={token}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
