mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{TestApp, WEBHOOK_SECRET};
use dropiq_core::providers::sign_webhook_payload;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

struct Fixture {
    app: TestApp,
    owner: String,
    admin: String,
    campaign_id: String,
}

async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    let owner = app.register("owner@example.com").await;
    let admin = app.register_admin("admin@example.com").await;

    let (_, body) = app
        .post("/api/airdrops", Some(&owner), json!({ "name": "Blast" }))
        .await;
    let airdrop_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            "/api/campaigns",
            Some(&owner),
            json!({
                "airdrop_id": airdrop_id,
                "title": "Blast launch week",
                "budget_cents": 50_000,
                "duration_days": 7
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let campaign_id = body["data"]["campaign"]["id"].as_str().unwrap().to_string();
    assert_eq!(
        body["data"]["checkout_url"],
        format!("https://pay.example/{campaign_id}")
    );
    assert_eq!(body["data"]["campaign"]["status"], "pending_payment");
    assert_eq!(body["data"]["campaign"]["payment_status"], "unpaid");

    Fixture {
        app,
        owner,
        admin,
        campaign_id,
    }
}

async fn deliver(app: &TestApp, event: Value, signature: Option<String>) -> (StatusCode, Value) {
    let payload = event.to_string();
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/payments")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }
    app.send(builder.body(Body::from(payload)).unwrap()).await
}

fn completed_event(campaign_id: &str) -> Value {
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_0",
            "object": "checkout.session",
            "payment_intent": "pi_123",
            "client_reference_id": campaign_id
        }}
    })
}

fn sign(event: &Value) -> String {
    sign_webhook_payload(
        event.to_string().as_bytes(),
        WEBHOOK_SECRET,
        chrono::Utc::now().timestamp(),
    )
}

#[tokio::test]
async fn test_reject_unpaid_with_refund_skips_refund() {
    let f = fixture().await;
    let path = format!("/api/campaigns/{}/reject", f.campaign_id);

    let (status, body) = f
        .app
        .post(&path, Some(&f.admin), json!({ "reason": "spam", "refund": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["payment_status"], "unpaid");
    assert!(f.app.payments.refund_calls().is_empty());

    let (status, _) = f.app.post(&path, Some(&f.admin), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_approve_requires_payment() {
    let f = fixture().await;
    let approve = format!("/api/campaigns/{}/approve", f.campaign_id);

    let (status, _) = f.app.post(&approve, Some(&f.owner), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f.app.post(&approve, Some(&f.admin), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let event = completed_event(&f.campaign_id);
    let signature = sign(&event);
    let (status, body) = deliver(&f.app, event, Some(signature)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "updated");
    assert_eq!(body["data"]["payment_status"], "paid");

    let (status, body) = f.app.post(&approve, Some(&f.admin), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");
    assert!(body["data"]["ends_at"].is_string());
}

#[tokio::test]
async fn test_reject_paid_refunds() {
    let f = fixture().await;
    let event = completed_event(&f.campaign_id);
    let signature = sign(&event);
    deliver(&f.app, event, Some(signature)).await;

    let (status, body) = f
        .app
        .post(
            &format!("/api/campaigns/{}/reject", f.campaign_id),
            Some(&f.admin),
            json!({ "refund": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["payment_status"], "refunded");
    assert_eq!(f.app.payments.refund_calls(), vec!["pi_123".to_string()]);
}

#[tokio::test]
async fn test_webhook_signature_checks() {
    let f = fixture().await;
    let event = completed_event(&f.campaign_id);

    let (status, body) = deliver(&f.app, event.clone(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let forged = sign_webhook_payload(event.to_string().as_bytes(), "wrong", chrono::Utc::now().timestamp());
    let (status, _) = deliver(&f.app, event.clone(), Some(forged)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stale = sign_webhook_payload(
        event.to_string().as_bytes(),
        WEBHOOK_SECRET,
        chrono::Utc::now().timestamp() - 3600,
    );
    let (status, _) = deliver(&f.app, event.clone(), Some(stale)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = deliver(&f.app, event, Some("t=-9223372036854775808,v1=00".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, body) = f
        .app
        .get(&format!("/api/campaigns/{}", f.campaign_id), Some(&f.owner))
        .await;
    assert_eq!(body["data"]["payment_status"], "unpaid");
}

#[tokio::test]
async fn test_unknown_webhook_event_is_acknowledged() {
    let f = fixture().await;
    let event = json!({ "id": "evt_2", "type": "customer.created", "data": { "object": { "id": "cus_1" } } });
    let signature = sign(&event);
    let (status, body) = deliver(&f.app, event, Some(signature)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "ignored");
}

#[tokio::test]
async fn test_campaign_visibility() {
    let f = fixture().await;
    let stranger = f.app.register("eve@example.com").await;
    let path = format!("/api/campaigns/{}", f.campaign_id);

    assert_eq!(f.app.get(&path, Some(&stranger)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(f.app.get(&path, Some(&f.admin)).await.0, StatusCode::OK);

    let (_, body) = f.app.get("/api/campaigns", Some(&stranger)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let (_, body) = f.app.get("/api/campaigns?status=pending_payment", Some(&f.admin)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
