use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_tax_status, validate_tax_type};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaxRequest {
    pub station_id: Option<Uuid>,

    #[validate(custom(function = "validate_tax_type"))]
    pub tax_type: String,

    #[validate(range(min = 0, message = "Tax amount cannot be negative"))]
    pub tax_amount: i64,

    pub due_date: Option<NaiveDate>,
    pub tax_notice_number: Option<String>,
    pub tax_year: Option<i32>,
    pub tax_period: Option<String>,
    pub notes: Option<String>,

    /// Defaults to the first workflow status of the tax type.
    #[validate(custom(function = "validate_tax_status"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaxRequest {
    pub station_id: Option<Uuid>,

    #[validate(custom(function = "validate_tax_type"))]
    pub tax_type: String,

    #[validate(range(min = 0, message = "Tax amount cannot be negative"))]
    pub tax_amount: i64,

    pub due_date: Option<NaiveDate>,
    pub tax_notice_number: Option<String>,
    pub tax_year: Option<i32>,
    pub tax_period: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaxStatusRequest {
    #[validate(custom(function = "validate_tax_status"))]
    pub status: String,
}

/// Query parameters for listing tax obligations.
#[derive(Debug, Deserialize, Default)]
pub struct ListTaxesQuery {
    pub station_id: Option<Uuid>,
    pub status: Option<String>,
    pub tax_type: Option<String>,
    pub due_after: Option<NaiveDate>,
    pub due_before: Option<NaiveDate>,
}
