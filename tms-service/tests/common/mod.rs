//! Test helper module for tms-service integration tests.
//!
//! Spawns the application on a random port with the in-memory store
//! and mock providers, and wraps requests with gateway identity
//! headers.

#![allow(dead_code)]

use reqwest::Method;
use service_core::config::Config as CoreConfig;
use tms_service::config::{
    DatabaseConfig, EmailConfig, GenaiConfig, JobsConfig, SecurityConfig, TmsConfig, WebhookConfig,
};
use tms_service::startup::Application;

pub const ADMIN_USER_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const VIEWER_USER_ID: &str = "22222222-2222-2222-2222-222222222222";

/// Configuration with every external integration disabled, so the
/// service runs on the in-memory store and mock providers.
pub fn test_config() -> TmsConfig {
    TmsConfig {
        common: CoreConfig { port: 0 },
        service_name: "tms-service-test".to_string(),
        log_level: "warn".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 2,
            min_connections: 1,
            enabled: false,
        },
        webhook: WebhookConfig {
            timeout_seconds: 5,
            enabled: false,
        },
        email: EmailConfig {
            api_key: String::new(),
            api_base: "https://api.sendgrid.com/v3".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "TMS 세금 관리 시스템".to_string(),
            enabled: false,
        },
        genai: GenaiConfig {
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
            enabled: false,
        },
        jobs: JobsConfig { cron_secret: None },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a new test application on a random port.
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    /// Spawn with a customized configuration.
    pub async fn spawn_with(config: TmsConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Request carrying admin identity headers.
    pub fn admin(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("x-user-id", ADMIN_USER_ID)
            .header("x-user-role", "admin")
            .header("x-user-name", "Test Admin")
    }

    /// Request carrying viewer identity headers.
    pub fn viewer(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("x-user-id", VIEWER_USER_ID)
            .header("x-user-role", "viewer")
    }

    /// Request without identity headers.
    pub fn anonymous(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Create a station through the API and return its id.
    pub async fn create_station(&self, name: &str) -> String {
        let response = self
            .admin(Method::POST, "/api/stations")
            .json(&serde_json::json!({
                "station_name": name,
                "location": "서울특별시 강남구",
            }))
            .send()
            .await
            .expect("Failed to create station");
        assert_eq!(response.status(), 201, "station create should succeed");
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        body["station_id"].as_str().expect("missing id").to_string()
    }

    /// Create a tax obligation through the API and return its id.
    pub async fn create_tax(&self, body: serde_json::Value) -> String {
        let response = self
            .admin(Method::POST, "/api/taxes")
            .json(&body)
            .send()
            .await
            .expect("Failed to create tax");
        assert_eq!(response.status(), 201, "tax create should succeed");
        let parsed: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        parsed["tax_id"].as_str().expect("missing id").to_string()
    }
}
