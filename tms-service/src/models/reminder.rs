//! Reminder model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a reminder came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    Auto,
    Manual,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Auto => "auto",
            ReminderType::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(ReminderType::Auto),
            "manual" => Some(ReminderType::Manual),
            _ => None,
        }
    }
}

/// Reminder record. Auto reminders are keyed by
/// (tax, schedule, date, time); manual reminders may target a specific
/// channel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub reminder_id: Uuid,
    pub tax_id: Option<Uuid>,
    pub notification_type: String,
    pub schedule_id: Option<Uuid>,
    pub notification_date: NaiveDate,
    pub notification_time: NaiveTime,
    pub message: String,
    pub is_sent: bool,
    pub sent_utc: Option<DateTime<Utc>>,
    pub channel_id: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}

/// Input for inserting a reminder.
#[derive(Debug, Clone)]
pub struct CreateReminder {
    pub tax_id: Option<Uuid>,
    pub notification_type: ReminderType,
    pub schedule_id: Option<Uuid>,
    pub notification_date: NaiveDate,
    pub notification_time: NaiveTime,
    pub message: String,
    pub channel_id: Option<Uuid>,
}

/// Dedup key for an auto reminder.
#[derive(Debug, Clone, Copy)]
pub struct AutoReminderKey {
    pub tax_id: Uuid,
    pub schedule_id: Uuid,
    pub notification_date: NaiveDate,
    pub notification_time: NaiveTime,
}
