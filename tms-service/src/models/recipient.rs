//! Email recipient model. A flat list; every broadcast goes to all
//! active recipients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailRecipient {
    pub recipient_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a recipient.
#[derive(Debug, Clone)]
pub struct CreateRecipient {
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
}

/// Input for replacing a recipient.
#[derive(Debug, Clone)]
pub struct UpdateRecipient {
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
}
