//! Outbound chat-webhook channel model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Webhook destination for reminder broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutboundChannel {
    pub channel_id: Uuid,
    pub channel_name: String,
    pub webhook_url: String,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a channel.
#[derive(Debug, Clone)]
pub struct CreateChannel {
    pub channel_name: String,
    pub webhook_url: String,
    pub is_active: bool,
}

/// Input for replacing a channel.
#[derive(Debug, Clone)]
pub struct UpdateChannel {
    pub channel_name: String,
    pub webhook_url: String,
    pub is_active: bool,
}
