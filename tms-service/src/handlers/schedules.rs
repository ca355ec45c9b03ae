//! Reminder schedule settings.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::dtos::schedule::{CreateScheduleRequest, UpdateScheduleRequest};
use crate::middleware::RequestUser;
use crate::models::{AuditAction, CreateSchedule, ReminderSchedule, UpdateSchedule};
use crate::utils::validation::{parse_time_of_day, ValidatedJson};
use crate::AppState;
use service_core::error::AppError;

fn time_of_day(s: &str) -> Result<chrono::NaiveTime, AppError> {
    parse_time_of_day(s)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid notification time: {s}")))
}

#[tracing::instrument(skip(state, user, request))]
pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    ValidatedJson(request): ValidatedJson<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ReminderSchedule>), AppError> {
    let schedule = state
        .store
        .create_schedule(&CreateSchedule {
            schedule_name: request.schedule_name,
            days_before: request.days_before,
            notification_time: time_of_day(&request.notification_time)?,
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    state
        .audit
        .record(
            &user,
            "schedules",
            AuditAction::Create,
            format!("알림 스케줄 등록: {}", schedule.schedule_name),
            "reminder_schedules",
            Some(schedule.schedule_id.to_string()),
            Some(json!({
                "schedule_name": schedule.schedule_name,
                "days_before": schedule.days_before,
                "is_active": schedule.is_active,
            })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(schedule)))
}

#[tracing::instrument(skip(state))]
pub async fn list_schedules(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReminderSchedule>>, AppError> {
    Ok(Json(state.store.list_schedules().await?))
}

#[tracing::instrument(skip(state, user, request))]
pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(schedule_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateScheduleRequest>,
) -> Result<Json<ReminderSchedule>, AppError> {
    let schedule = state
        .store
        .update_schedule(
            schedule_id,
            &UpdateSchedule {
                schedule_name: request.schedule_name,
                days_before: request.days_before,
                notification_time: time_of_day(&request.notification_time)?,
                is_active: request.is_active,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Schedule not found")))?;

    state
        .audit
        .record(
            &user,
            "schedules",
            AuditAction::Update,
            format!("알림 스케줄 수정: {}", schedule.schedule_name),
            "reminder_schedules",
            Some(schedule.schedule_id.to_string()),
            Some(json!({
                "days_before": schedule.days_before,
                "is_active": schedule.is_active,
            })),
        )
        .await;

    Ok(Json(schedule))
}

#[tracing::instrument(skip(state, user))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(schedule_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_schedule(schedule_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Schedule not found")));
    }

    state
        .audit
        .record(
            &user,
            "schedules",
            AuditAction::Delete,
            "알림 스케줄 삭제".to_string(),
            "reminder_schedules",
            Some(schedule_id.to_string()),
            None,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
