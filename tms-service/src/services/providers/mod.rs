//! Outbound provider abstractions and implementations.
//!
//! Chat webhooks, email, and the vision model are each consumed
//! through a trait with a real implementation and a mock, selected at
//! startup.

pub mod email;
pub mod genai;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

pub use email::{MockEmailProvider, SendGridProvider};
pub use genai::{GeminiVisionProvider, MockVisionProvider};
pub use webhook::{HttpWebhookProvider, MockWebhookProvider};

/// Error type for provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not enabled: {0}")]
    NotEnabled(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited")]
    RateLimited,
}

/// Inline image handed to the vision provider.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub mime_type: String,
    pub data_base64: String,
}

/// Generation parameters for vision requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<i32>,
}

/// Chat webhook destination. One POST per channel URL.
#[async_trait]
pub trait WebhookProvider: Send + Sync {
    async fn post_text(&self, webhook_url: &str, text: &str) -> Result<(), ProviderError>;
    fn is_enabled(&self) -> bool;
}

/// Email broadcast provider.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_broadcast(
        &self,
        recipients: &[String],
        subject: &str,
        body_text: &str,
        body_html: &str,
    ) -> Result<(), ProviderError>;
    fn is_enabled(&self) -> bool;
}

/// Vision-capable text generation provider.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Run one generation. Returns the model text, or `None` when the
    /// model produced no text candidate.
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        image: Option<&ImagePart>,
        params: &GenerationParams,
    ) -> Result<Option<String>, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
    fn is_enabled(&self) -> bool;
}
