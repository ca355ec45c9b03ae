//! Test-send integration tests for webhook and email broadcasts.

mod common;

use common::TestApp;
use reqwest::Method;

#[tokio::test]
async fn webhook_without_targets_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/notifications/webhook")
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);

    // Non-http entries are filtered out before dispatch.
    let response = app
        .admin(Method::POST, "/api/notifications/webhook")
        .json(&serde_json::json!({ "webhook_urls": ["ftp://hooks.example.com/a"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn webhook_broadcast_counts_sent_and_failed() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/notifications/webhook")
        .json(&serde_json::json!({
            "webhook_urls": [
                "https://hooks.example.com/ok",
                "https://hooks.example.com/fail-case",
            ],
            "text": "점검 메시지",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["success"], true);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["failed"], 1);
}

#[tokio::test]
async fn webhook_resolves_channels_and_dedupes() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/channels")
        .json(&serde_json::json!({
            "channel_name": "운영팀 Teams",
            "webhook_url": "https://hooks.example.com/shared",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let active_id = body["channel_id"].as_str().unwrap().to_string();

    let response = app
        .admin(Method::POST, "/api/channels")
        .json(&serde_json::json!({
            "channel_name": "구 채널",
            "webhook_url": "https://hooks.example.com/retired",
            "is_active": false,
        }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let inactive_id = body["channel_id"].as_str().unwrap().to_string();

    // The explicit URL matches the active channel; inactive channels
    // contribute nothing.
    let response = app
        .admin(Method::POST, "/api/notifications/webhook")
        .json(&serde_json::json!({
            "webhook_urls": ["https://hooks.example.com/shared"],
            "channel_ids": [active_id, inactive_id],
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["sent"], 1);
    assert_eq!(body["failed"], 0);
}

#[tokio::test]
async fn email_without_recipients_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/notifications/email")
        .json(&serde_json::json!({ "subject": "수신자 없는 메일" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn email_broadcast_reaches_active_recipients() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/recipients")
        .json(&serde_json::json!({
            "email": "finance@example.com",
            "name": "재무팀",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 201);

    let response = app
        .admin(Method::POST, "/api/notifications/email")
        .json(&serde_json::json!({
            "subject": "7월 세금 일정 안내",
            "content": "납부 기한을 확인해주세요.",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email sent successfully");
}
