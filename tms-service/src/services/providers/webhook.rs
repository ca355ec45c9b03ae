//! Chat webhook provider.
//!
//! Teams/Slack style incoming webhooks accept a JSON `{text}` payload.
//! Delivery is fire-and-forget; callers count failures but never retry.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{ProviderError, WebhookProvider};
use crate::config::WebhookConfig;
use crate::services::metrics::record_provider_call;

pub struct HttpWebhookProvider {
    config: WebhookConfig,
    client: Client,
}

impl HttpWebhookProvider {
    pub fn new(config: WebhookConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl WebhookProvider for HttpWebhookProvider {
    async fn post_text(&self, webhook_url: &str, text: &str) -> Result<(), ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "Webhook provider is not enabled".to_string(),
            ));
        }

        let response = self
            .client
            .post(webhook_url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                record_provider_call("webhook", "error");
                ProviderError::Connection(format!("Webhook request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            record_provider_call("webhook", "error");
            return Err(ProviderError::SendFailed(format!(
                "Webhook returned {}: {}",
                status, body
            )));
        }

        record_provider_call("webhook", "success");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock webhook provider for testing. Records every delivery; URLs
/// containing "fail" are rejected so failure paths can be exercised.
pub struct MockWebhookProvider {
    enabled: bool,
    send_count: AtomicU64,
    deliveries: Mutex<Vec<(String, String)>>,
}

impl MockWebhookProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            send_count: AtomicU64::new(0),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Captured (url, text) pairs, in delivery order.
    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookProvider for MockWebhookProvider {
    async fn post_text(&self, webhook_url: &str, text: &str) -> Result<(), ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock webhook provider is not enabled".to_string(),
            ));
        }

        if webhook_url.contains("fail") {
            return Err(ProviderError::SendFailed(format!(
                "Mock delivery refused for {}",
                webhook_url
            )));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.deliveries
            .lock()
            .unwrap()
            .push((webhook_url.to_string(), text.to_string()));

        tracing::info!(url = %webhook_url, "[MOCK] Webhook message would be sent");

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
