//! Audit trail of staff mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What kind of mutation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub log_id: Uuid,
    pub menu: String,
    pub action: String,
    pub actor_id: String,
    pub actor_name: String,
    pub description: String,
    pub target_table: Option<String>,
    pub target_id: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub created_utc: DateTime<Utc>,
}

/// Input for recording an audit entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub menu: String,
    pub action: AuditAction,
    pub actor_id: String,
    pub actor_name: String,
    pub description: String,
    pub target_table: Option<String>,
    pub target_id: Option<String>,
    pub changes: Option<serde_json::Value>,
}
