//! Reminder schedule model ("N days before the due date at time T").

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Reminder schedule record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReminderSchedule {
    pub schedule_id: Uuid,
    pub schedule_name: String,
    pub days_before: i32,
    pub notification_time: NaiveTime,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a schedule.
#[derive(Debug, Clone)]
pub struct CreateSchedule {
    pub schedule_name: String,
    pub days_before: i32,
    pub notification_time: NaiveTime,
    pub is_active: bool,
}

/// Input for replacing a schedule.
#[derive(Debug, Clone)]
pub struct UpdateSchedule {
    pub schedule_name: String,
    pub days_before: i32,
    pub notification_time: NaiveTime,
    pub is_active: bool,
}
