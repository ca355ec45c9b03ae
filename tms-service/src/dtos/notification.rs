use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Ad hoc webhook broadcast. Explicit URLs and channel references are
/// merged and deduplicated.
#[derive(Debug, Deserialize, Validate)]
pub struct SendWebhookRequest {
    pub webhook_urls: Option<Vec<String>>,
    pub channel_ids: Option<Vec<Uuid>>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendWebhookResponse {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendEmailRequest {
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,

    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
}
