//! Reminder management and urgency report integration tests.

mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use reqwest::Method;
use tms_service::services::clock::kst_today;

#[tokio::test]
async fn manual_reminder_roundtrip() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/reminders")
        .json(&serde_json::json!({
            "notification_date": "2026-12-01",
            "notification_time": "14:00",
            "message": "부가세 신고 마감 알림",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["notification_type"], "manual");
    assert_eq!(body["is_sent"], false);
    let reminder_id = body["reminder_id"].as_str().unwrap().to_string();

    let response = app
        .viewer(Method::GET, "/api/reminders?notification_type=manual")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));

    // Unsent reminders can be removed.
    let response = app
        .admin(Method::DELETE, &format!("/api/reminders/{}", reminder_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn manual_reminder_with_unknown_channel_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/reminders")
        .json(&serde_json::json!({
            "notification_date": "2026-12-01",
            "notification_time": "14:00",
            "message": "채널 없는 알림",
            "channel_id": "00000000-0000-0000-0000-000000000000",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn sent_reminder_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let today = kst_today(Utc::now());

    let response = app
        .admin(Method::POST, "/api/reminders")
        .json(&serde_json::json!({
            "notification_date": today.to_string(),
            "notification_time": "00:00",
            "message": "오늘 발송될 알림",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let reminder_id = body["reminder_id"].as_str().unwrap().to_string();

    // No cron secret configured, so the dispatch trigger is open.
    let response = app
        .anonymous(Method::POST, "/api/reminders/dispatch")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["dispatchedManual"], 1);

    let response = app
        .admin(Method::DELETE, &format!("/api/reminders/{}", reminder_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 409);

    let response = app
        .viewer(Method::GET, "/api/reminders?is_sent=true")
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));
    assert_eq!(body[0]["is_sent"], true);
}

#[tokio::test]
async fn upcoming_report_buckets_by_urgency() {
    let app = TestApp::spawn().await;
    let today = kst_today(Utc::now());

    app.create_tax(serde_json::json!({
        "tax_type": "property",
        "tax_amount": 100_000,
        "due_date": (today - Duration::days(1)).to_string(),
    }))
    .await;
    app.create_tax(serde_json::json!({
        "tax_type": "local",
        "tax_amount": 200_000,
        "due_date": (today + Duration::days(3)).to_string(),
    }))
    .await;
    app.create_tax(serde_json::json!({
        "tax_type": "other",
        "tax_amount": 300_000,
        "due_date": (today + Duration::days(10)).to_string(),
    }))
    .await;
    // Too far out to appear
    app.create_tax(serde_json::json!({
        "tax_type": "other",
        "tax_amount": 400_000,
        "due_date": (today + Duration::days(40)).to_string(),
    }))
    .await;
    // Completed obligations are not reported
    app.create_tax(serde_json::json!({
        "tax_type": "property",
        "tax_amount": 500_000,
        "due_date": (today + Duration::days(2)).to_string(),
        "status": "payment_completed",
    }))
    .await;

    let response = app
        .viewer(Method::GET, "/api/reminders/upcoming")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let rows = body.as_array().expect("expected array");
    assert_eq!(rows.len(), 3);

    // Sorted by days until due
    assert_eq!(rows[0]["urgency"], "overdue");
    assert_eq!(rows[0]["days_until_due"], -1);
    assert_eq!(rows[1]["urgency"], "7_days");
    assert_eq!(rows[2]["urgency"], "14_days");
}
