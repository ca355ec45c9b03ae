use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_time_of_day;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateManualReminderRequest {
    pub tax_id: Option<Uuid>,

    pub notification_date: NaiveDate,

    /// "HH:MM" or "HH:MM:SS".
    #[validate(custom(function = "validate_time_of_day"))]
    pub notification_time: String,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,

    /// Specific destination; all active channels when absent.
    pub channel_id: Option<Uuid>,
}

/// Query parameters for listing reminders.
#[derive(Debug, Deserialize, Default)]
pub struct ListRemindersQuery {
    pub notification_type: Option<String>,
    pub is_sent: Option<bool>,
}

/// Outcome of a generator run.
#[derive(Debug, Serialize)]
pub struct GenerateRemindersResponse {
    pub success: bool,
    pub created: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Outcome of a dispatcher run.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub dispatched: usize,
    #[serde(rename = "dispatchedManual")]
    pub dispatched_manual: usize,
    pub now: DateTime<Utc>,
}

/// Tax obligation classified by payment urgency.
#[derive(Debug, Serialize)]
pub struct UpcomingTax {
    pub tax_id: Uuid,
    pub station_id: Option<Uuid>,
    pub tax_type: String,
    pub tax_amount: i64,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub urgency: &'static str,
}
