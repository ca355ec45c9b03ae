//! Webhook channel settings.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::dtos::channel::{CreateChannelRequest, UpdateChannelRequest};
use crate::middleware::RequestUser;
use crate::models::{AuditAction, CreateChannel, OutboundChannel, UpdateChannel};
use crate::utils::validation::ValidatedJson;
use crate::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state, user, request))]
pub async fn create_channel(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    ValidatedJson(request): ValidatedJson<CreateChannelRequest>,
) -> Result<(StatusCode, Json<OutboundChannel>), AppError> {
    let channel = state
        .store
        .create_channel(&CreateChannel {
            channel_name: request.channel_name,
            webhook_url: request.webhook_url,
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    state
        .audit
        .record(
            &user,
            "channels",
            AuditAction::Create,
            format!("알림 채널 등록: {}", channel.channel_name),
            "notification_channels",
            Some(channel.channel_id.to_string()),
            Some(json!({
                "channel_name": channel.channel_name,
                "is_active": channel.is_active,
            })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(channel)))
}

#[tracing::instrument(skip(state))]
pub async fn list_channels(
    State(state): State<AppState>,
) -> Result<Json<Vec<OutboundChannel>>, AppError> {
    Ok(Json(state.store.list_channels().await?))
}

#[tracing::instrument(skip(state, user, request))]
pub async fn update_channel(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(channel_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateChannelRequest>,
) -> Result<Json<OutboundChannel>, AppError> {
    let channel = state
        .store
        .update_channel(
            channel_id,
            &UpdateChannel {
                channel_name: request.channel_name,
                webhook_url: request.webhook_url,
                is_active: request.is_active,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Channel not found")))?;

    state
        .audit
        .record(
            &user,
            "channels",
            AuditAction::Update,
            format!("알림 채널 수정: {}", channel.channel_name),
            "notification_channels",
            Some(channel.channel_id.to_string()),
            Some(json!({ "is_active": channel.is_active })),
        )
        .await;

    Ok(Json(channel))
}

#[tracing::instrument(skip(state, user))]
pub async fn delete_channel(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(channel_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let channel = state
        .store
        .get_channel(channel_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Channel not found")))?;

    if !state.store.delete_channel(channel_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Channel not found")));
    }

    state
        .audit
        .record(
            &user,
            "channels",
            AuditAction::Delete,
            format!("알림 채널 삭제: {}", channel.channel_name),
            "notification_channels",
            Some(channel_id.to_string()),
            None,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
