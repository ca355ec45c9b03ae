//! Best-effort audit trail recording.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::middleware::RequestUser;
use crate::models::{AuditAction, CreateAuditLog};
use crate::services::store::Store;

/// Records staff mutations. Audit failures are logged and swallowed;
/// they never fail the mutating request.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn Store>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        user: &RequestUser,
        menu: &str,
        action: AuditAction,
        description: String,
        target_table: &str,
        target_id: Option<String>,
        changes: Option<Value>,
    ) {
        let entry = CreateAuditLog {
            menu: menu.to_string(),
            action,
            actor_id: user.user_id.clone(),
            actor_name: user.display_name().to_string(),
            description,
            target_table: Some(target_table.to_string()),
            target_id,
            changes,
        };

        if let Err(e) = self.store.insert_audit_log(&entry).await {
            warn!(menu, action = action.as_str(), error = %e, "Failed to record audit entry");
        }
    }
}
