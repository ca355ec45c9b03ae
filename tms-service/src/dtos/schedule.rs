use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::validate_time_of_day;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, message = "Schedule name is required"))]
    pub schedule_name: String,

    #[validate(range(min = 0, max = 365, message = "Days before must be between 0 and 365"))]
    pub days_before: i32,

    /// "HH:MM" or "HH:MM:SS".
    #[validate(custom(function = "validate_time_of_day"))]
    pub notification_time: String,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateScheduleRequest {
    #[validate(length(min = 1, message = "Schedule name is required"))]
    pub schedule_name: String,

    #[validate(range(min = 0, max = 365, message = "Days before must be between 0 and 365"))]
    pub days_before: i32,

    #[validate(custom(function = "validate_time_of_day"))]
    pub notification_time: String,

    pub is_active: bool,
}
