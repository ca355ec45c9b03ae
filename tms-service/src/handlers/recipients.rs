//! Email recipient settings.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::dtos::recipient::{CreateRecipientRequest, UpdateRecipientRequest};
use crate::middleware::RequestUser;
use crate::models::{AuditAction, CreateRecipient, EmailRecipient, UpdateRecipient};
use crate::utils::validation::ValidatedJson;
use crate::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state, user, request))]
pub async fn create_recipient(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    ValidatedJson(request): ValidatedJson<CreateRecipientRequest>,
) -> Result<(StatusCode, Json<EmailRecipient>), AppError> {
    let recipient = state
        .store
        .create_recipient(&CreateRecipient {
            email: request.email,
            name: request.name,
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    state
        .audit
        .record(
            &user,
            "emails",
            AuditAction::Create,
            format!("이메일 수신자 등록: {}", recipient.email),
            "email_recipients",
            Some(recipient.recipient_id.to_string()),
            Some(json!({
                "email": recipient.email,
                "is_active": recipient.is_active,
            })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(recipient)))
}

#[tracing::instrument(skip(state))]
pub async fn list_recipients(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmailRecipient>>, AppError> {
    Ok(Json(state.store.list_recipients().await?))
}

#[tracing::instrument(skip(state, user, request))]
pub async fn update_recipient(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(recipient_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateRecipientRequest>,
) -> Result<Json<EmailRecipient>, AppError> {
    let recipient = state
        .store
        .update_recipient(
            recipient_id,
            &UpdateRecipient {
                email: request.email,
                name: request.name,
                is_active: request.is_active,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Recipient not found")))?;

    state
        .audit
        .record(
            &user,
            "emails",
            AuditAction::Update,
            format!("이메일 수신자 수정: {}", recipient.email),
            "email_recipients",
            Some(recipient.recipient_id.to_string()),
            Some(json!({ "is_active": recipient.is_active })),
        )
        .await;

    Ok(Json(recipient))
}

#[tracing::instrument(skip(state, user))]
pub async fn delete_recipient(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(recipient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_recipient(recipient_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Recipient not found")));
    }

    state
        .audit
        .record(
            &user,
            "emails",
            AuditAction::Delete,
            "이메일 수신자 삭제".to_string(),
            "email_recipients",
            Some(recipient_id.to_string()),
            None,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
