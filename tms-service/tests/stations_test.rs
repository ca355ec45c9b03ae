//! Station management integration tests for tms-service.

mod common;

use common::TestApp;
use reqwest::Method;

#[tokio::test]
async fn create_station_defaults_to_operating() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/stations")
        .json(&serde_json::json!({
            "station_name": "강남 1호 충전소",
            "location": "서울특별시 강남구",
            "address": "테헤란로 123",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["station_name"], "강남 1호 충전소");
    assert_eq!(body["status"], "operating");
    assert!(body["station_id"].is_string());
}

#[tokio::test]
async fn create_station_rejects_unknown_status() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/api/stations")
        .json(&serde_json::json!({
            "station_name": "테스트 충전소",
            "location": "부산광역시",
            "status": "demolished",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn list_stations_returns_created_rows() {
    let app = TestApp::spawn().await;
    app.create_station("충전소 A").await;
    app.create_station("충전소 B").await;

    let response = app
        .viewer(Method::GET, "/api/stations")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.as_array().map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn update_station_works() {
    let app = TestApp::spawn().await;
    let station_id = app.create_station("업데이트 전").await;

    let response = app
        .admin(Method::PUT, &format!("/api/stations/{}", station_id))
        .json(&serde_json::json!({
            "station_name": "업데이트 후",
            "location": "대전광역시",
            "status": "planned",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["station_name"], "업데이트 후");
    assert_eq!(body["status"], "planned");
}

#[tokio::test]
async fn update_missing_station_is_404() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(
            Method::PUT,
            "/api/stations/00000000-0000-0000-0000-000000000000",
        )
        .json(&serde_json::json!({
            "station_name": "없는 충전소",
            "location": "어딘가",
            "status": "operating",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn delete_station_with_taxes_is_conflict() {
    let app = TestApp::spawn().await;
    let station_id = app.create_station("세금 있는 충전소").await;
    let tax_id = app
        .create_tax(serde_json::json!({
            "station_id": station_id,
            "tax_type": "property",
            "tax_amount": 1_000_000,
            "due_date": "2026-12-10",
        }))
        .await;

    let response = app
        .admin(Method::DELETE, &format!("/api/stations/{}", station_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 409);

    // After the obligation is gone the station can be deleted.
    let response = app
        .admin(Method::DELETE, &format!("/api/taxes/{}", tax_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 204);

    let response = app
        .admin(Method::DELETE, &format!("/api/stations/{}", station_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 204);
}
