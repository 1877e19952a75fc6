mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_strategy_lifecycle() {
    let app = TestApp::new().await;
    let author = app.register("author@example.com").await;
    let reader = app.register("reader@example.com").await;

    let (status, body) = app
        .post(
            "/api/strategies",
            Some(&author),
            json!({ "title": "Bridge weekly", "content": "Bridge 0.01 ETH every Monday" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Ratings: not your own, and only 1..=5
    let rate = format!("/api/strategies/{id}/rate");
    assert_eq!(app.post(&rate, Some(&author), json!({ "rating": 5 })).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(app.post(&rate, Some(&reader), json!({ "rating": 6 })).await.0, StatusCode::BAD_REQUEST);
    let (status, body) = app.post(&rate, Some(&reader), json!({ "rating": 4 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating_count"], 1);

    // Copies are private and point back at the source
    let (status, body) = app
        .post(&format!("/api/strategies/{id}/copy"), Some(&reader), json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["is_public"], false);
    assert_eq!(body["data"]["original_strategy_id"], id.as_str());
    let copy_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(
        app.get(&format!("/api/strategies/{copy_id}"), None).await.0,
        StatusCode::NOT_FOUND
    );

    let (_, body) = app.get(&format!("/api/strategies/{id}"), None).await;
    assert_eq!(body["data"]["copy_count"], 1);

    // Only the author edits
    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/strategies/{id}"),
            Some(&reader),
            Some(json!({ "title": "Mine now" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_comments_and_tips() {
    let app = TestApp::new().await;
    let author = app.register("author@example.com").await;
    let reader = app.register("reader@example.com").await;
    let (_, body) = app
        .post(
            "/api/strategies",
            Some(&author),
            json!({ "title": "Daily swaps", "content": "Swap on two DEXes" }),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let comments = format!("/api/strategies/{id}/comments");
    let (status, _) = app.post(&comments, Some(&reader), json!({ "body": "Works" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = app.get(&comments, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let tips = format!("/api/strategies/{id}/tips");
    assert_eq!(
        app.post(&tips, Some(&author), json!({ "amount_cents": 100 })).await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.post(&tips, Some(&reader), json!({ "amount_cents": 0 })).await.0,
        StatusCode::BAD_REQUEST
    );
    let (status, _) = app
        .post(&tips, Some(&reader), json!({ "amount_cents": 500, "message": "thanks" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get(&format!("/api/strategies/{id}"), None).await;
    assert_eq!(body["data"]["tip_total_cents"], 500);
}

#[tokio::test]
async fn test_blacklist() {
    let app = TestApp::new().await;
    let user = app.register("ann@example.com").await;
    let admin = app.register_admin("admin@example.com").await;
    let entry = json!({ "entry_type": "domain", "value": "uniswaap.org", "reason": "phishing" });

    assert_eq!(app.post("/api/blacklist", Some(&user), entry.clone()).await.0, StatusCode::FORBIDDEN);
    let (status, body) = app.post("/api/blacklist", Some(&admin), entry.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(app.post("/api/blacklist", Some(&admin), entry).await.0, StatusCode::CONFLICT);

    // Public check reduces URLs to their host
    let (status, body) = app
        .get("/api/blacklist/check?value=https://claim.uniswaap.org/airdrop", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["blacklisted"], true);

    let (_, body) = app.get("/api/blacklist?type=domain", Some(&admin)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let path = format!("/api/blacklist/{id}");
    assert_eq!(app.request(Method::DELETE, &path, Some(&admin), None).await.0, StatusCode::OK);
    assert_eq!(app.request(Method::DELETE, &path, Some(&admin), None).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_automation_approval_gate() {
    let app = TestApp::new().await;
    let user = app.register("ann@example.com").await;
    let other = app.register("bob@example.com").await;

    let (status, body) = app
        .post(
            "/api/automation/tasks",
            Some(&user),
            json!({ "task_type": "swap", "execution_mode": "semi_automatic", "payload": { "amount": "0.1" } }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["approval_status"], "pending");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let status_path = format!("/api/automation/tasks/{id}/status");
    let running = json!({ "status": "running" });
    let (status, _) = app
        .request(Method::PATCH, &status_path, Some(&user), Some(running.clone()))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(
        app.post(&format!("/api/automation/tasks/{id}/approve"), Some(&other), json!({})).await.0,
        StatusCode::NOT_FOUND
    );
    let (status, _) = app
        .post(&format!("/api/automation/tasks/{id}/approve"), Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(Method::PATCH, &status_path, Some(&user), Some(running))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "running");

    let (status, _) = app
        .request(Method::PATCH, &status_path, Some(&user), Some(json!({ "status": "queued" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
