//! Audit trail read endpoint.

use axum::{extract::State, Json};

use crate::models::AuditLog;
use crate::AppState;
use service_core::error::AppError;

const AUDIT_PAGE_SIZE: i64 = 100;

#[tracing::instrument(skip(state))]
pub async fn list_audit_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    Ok(Json(state.store.list_audit_logs(AUDIT_PAGE_SIZE).await?))
}
