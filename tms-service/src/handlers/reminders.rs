//! Reminder listing, manual reminders, and the urgency report.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::dtos::reminder::{CreateManualReminderRequest, ListRemindersQuery, UpcomingTax};
use crate::middleware::RequestUser;
use crate::models::{AuditAction, CreateReminder, Reminder, ReminderType};
use crate::services::clock::kst_today;
use crate::services::statistics::classify_upcoming;
use crate::utils::validation::{parse_time_of_day, ValidatedJson};
use crate::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state))]
pub async fn list_reminders(
    State(state): State<AppState>,
    Query(query): Query<ListRemindersQuery>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let notification_type = match query.notification_type.as_deref() {
        Some(s) => Some(ReminderType::parse(s).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!("Invalid notification type filter"))
        })?),
        None => None,
    };
    Ok(Json(
        state
            .store
            .list_reminders(notification_type, query.is_sent)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user, request))]
pub async fn create_manual_reminder(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    ValidatedJson(request): ValidatedJson<CreateManualReminderRequest>,
) -> Result<(StatusCode, Json<Reminder>), AppError> {
    let notification_time = parse_time_of_day(&request.notification_time).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Invalid notification time: {}",
            request.notification_time
        ))
    })?;

    if let Some(channel_id) = request.channel_id {
        state
            .store
            .get_channel(channel_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Channel not found: {channel_id}")))?;
    }

    let reminder = state
        .store
        .create_reminder(&CreateReminder {
            tax_id: request.tax_id,
            notification_type: ReminderType::Manual,
            schedule_id: None,
            notification_date: request.notification_date,
            notification_time,
            message: request.message,
            channel_id: request.channel_id,
        })
        .await?;

    state
        .audit
        .record(
            &user,
            "notifications",
            AuditAction::Create,
            format!("수동 알림 등록: {}", reminder.notification_date),
            "tax_notifications",
            Some(reminder.reminder_id.to_string()),
            Some(json!({
                "notification_date": reminder.notification_date,
                "notification_time": reminder.notification_time,
                "channel_id": reminder.channel_id,
            })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(reminder)))
}

/// Sent reminders stay for the record; only pending ones can go.
#[tracing::instrument(skip(state, user))]
pub async fn delete_reminder(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(reminder_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let reminder = state
        .store
        .get_reminder(reminder_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Reminder not found")))?;

    if reminder.is_sent {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Sent reminders cannot be deleted"
        )));
    }

    if !state.store.delete_reminder(reminder_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Reminder not found")));
    }

    state
        .audit
        .record(
            &user,
            "notifications",
            AuditAction::Delete,
            format!("알림 삭제: {}", reminder.notification_date),
            "tax_notifications",
            Some(reminder_id.to_string()),
            None,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn upcoming_taxes(
    State(state): State<AppState>,
) -> Result<Json<Vec<UpcomingTax>>, AppError> {
    let taxes = state.store.list_open_taxes_with_due_date().await?;
    let today = kst_today(Utc::now());
    Ok(Json(classify_upcoming(&taxes, today)))
}
