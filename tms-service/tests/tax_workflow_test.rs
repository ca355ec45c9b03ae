//! Tax obligation CRUD and workflow integration tests.

mod common;

use common::TestApp;
use reqwest::Method;

#[tokio::test]
async fn acquisition_tax_starts_in_accounting_review() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/taxes")
        .json(&serde_json::json!({
            "tax_type": "acquisition",
            "tax_amount": 5_000_000,
            "due_date": "2026-11-30",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "accounting_review");
}

#[tokio::test]
async fn property_tax_starts_in_payment_scheduled() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/taxes")
        .json(&serde_json::json!({
            "tax_type": "property",
            "tax_amount": 1_200_000,
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "payment_scheduled");
}

#[tokio::test]
async fn supplied_status_outside_workflow_is_rejected() {
    let app = TestApp::spawn().await;

    // accounting_review is a real status, but property tax never passes
    // through it.
    let response = app
        .admin(Method::POST, "/api/taxes")
        .json(&serde_json::json!({
            "tax_type": "property",
            "tax_amount": 800_000,
            "status": "accounting_review",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn status_moves_one_step_at_a_time() {
    let app = TestApp::spawn().await;
    let tax_id = app
        .create_tax(serde_json::json!({
            "tax_type": "acquisition",
            "tax_amount": 3_000_000,
            "due_date": "2026-09-15",
        }))
        .await;

    // One step forward
    let response = app
        .admin(Method::PATCH, &format!("/api/taxes/{}/status", tax_id))
        .json(&serde_json::json!({ "status": "payment_scheduled" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "payment_scheduled");

    // One step back
    let response = app
        .admin(Method::PATCH, &format!("/api/taxes/{}/status", tax_id))
        .json(&serde_json::json!({ "status": "accounting_review" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn status_jump_is_conflict() {
    let app = TestApp::spawn().await;
    let tax_id = app
        .create_tax(serde_json::json!({
            "tax_type": "acquisition",
            "tax_amount": 3_000_000,
        }))
        .await;

    // accounting_review -> payment_completed skips a step
    let response = app
        .admin(Method::PATCH, &format!("/api/taxes/{}/status", tax_id))
        .json(&serde_json::json!({ "status": "payment_completed" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn general_update_never_touches_status() {
    let app = TestApp::spawn().await;
    let tax_id = app
        .create_tax(serde_json::json!({
            "tax_type": "local",
            "tax_amount": 500_000,
            "due_date": "2026-08-31",
        }))
        .await;

    let response = app
        .admin(Method::PUT, &format!("/api/taxes/{}", tax_id))
        .json(&serde_json::json!({
            "tax_type": "local",
            "tax_amount": 650_000,
            "due_date": "2026-09-30",
            "notes": "금액 정정",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["tax_amount"], 650_000);
    assert_eq!(body["status"], "payment_scheduled");
}

#[tokio::test]
async fn create_with_unknown_station_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/taxes")
        .json(&serde_json::json!({
            "station_id": "00000000-0000-0000-0000-000000000000",
            "tax_type": "property",
            "tax_amount": 100_000,
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn negative_amount_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/taxes")
        .json(&serde_json::json!({
            "tax_type": "property",
            "tax_amount": -1,
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn list_filters_by_status_and_type() {
    let app = TestApp::spawn().await;
    let station_id = app.create_station("필터 충전소").await;

    app.create_tax(serde_json::json!({
        "station_id": station_id,
        "tax_type": "property",
        "tax_amount": 100_000,
        "due_date": "2026-07-15",
    }))
    .await;
    app.create_tax(serde_json::json!({
        "tax_type": "acquisition",
        "tax_amount": 200_000,
        "due_date": "2026-07-20",
    }))
    .await;

    let response = app
        .viewer(Method::GET, "/api/taxes?tax_type=property")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));
    assert_eq!(body[0]["tax_type"], "property");

    let response = app
        .viewer(Method::GET, "/api/taxes?status=accounting_review")
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));
    assert_eq!(body[0]["tax_type"], "acquisition");

    let response = app
        .viewer(
            Method::GET,
            &format!("/api/taxes?station_id={}", station_id),
        )
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));

    let response = app
        .viewer(
            Method::GET,
            "/api/taxes?due_after=2026-07-16&due_before=2026-07-31",
        )
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));
    assert_eq!(body[0]["tax_type"], "acquisition");

    let response = app
        .viewer(Method::GET, "/api/taxes?status=on_fire")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn delete_missing_tax_is_404() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(
            Method::DELETE,
            "/api/taxes/00000000-0000-0000-0000-000000000000",
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}
