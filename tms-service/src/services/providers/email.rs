//! Email provider backed by the SendGrid v3 mail/send API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{EmailProvider, ProviderError};
use crate::config::EmailConfig;
use crate::services::metrics::record_provider_call;

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: EmailAddress<'a>,
    subject: &'a str,
    content: Vec<MailContent<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<EmailAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct MailContent<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

pub struct SendGridProvider {
    config: EmailConfig,
    client: Client,
}

impl SendGridProvider {
    pub fn new(config: EmailConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    async fn send_broadcast(
        &self,
        recipients: &[String],
        subject: &str,
        body_text: &str,
        body_html: &str,
    ) -> Result<(), ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "Email provider is not enabled".to_string(),
            ));
        }
        if self.config.api_key.is_empty() {
            return Err(ProviderError::Configuration(
                "SendGrid API key not configured".to_string(),
            ));
        }

        let request = MailSendRequest {
            personalizations: vec![Personalization {
                to: recipients
                    .iter()
                    .map(|email| EmailAddress { email, name: None })
                    .collect(),
            }],
            from: EmailAddress {
                email: &self.config.from_email,
                name: Some(&self.config.from_name),
            },
            subject,
            // text/plain must precede text/html
            content: vec![
                MailContent {
                    content_type: "text/plain",
                    value: body_text,
                },
                MailContent {
                    content_type: "text/html",
                    value: body_html,
                },
            ],
        };

        let url = format!("{}/mail/send", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                record_provider_call("sendgrid", "error");
                ProviderError::Connection(format!("SendGrid request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            record_provider_call("sendgrid", "error");
            return Err(match status.as_u16() {
                401 | 403 => {
                    ProviderError::Authentication(format!("SendGrid rejected the API key: {}", body))
                }
                429 => ProviderError::RateLimited,
                _ => ProviderError::SendFailed(format!("SendGrid returned {}: {}", status, body)),
            });
        }

        record_provider_call("sendgrid", "success");
        tracing::info!(
            recipients = recipients.len(),
            subject = %subject,
            "Email broadcast accepted by SendGrid"
        );

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock email provider for testing.
pub struct MockEmailProvider {
    enabled: bool,
    send_count: AtomicU64,
}

impl MockEmailProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            send_count: AtomicU64::new(0),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send_broadcast(
        &self,
        recipients: &[String],
        subject: &str,
        _body_text: &str,
        _body_html: &str,
    ) -> Result<(), ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock email provider is not enabled".to_string(),
            ));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            recipients = recipients.len(),
            subject = %subject,
            "[MOCK] Email broadcast would be sent"
        );

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
