use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveTime;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::dtos::ErrorResponse;
use crate::models::{StationStatus, TaxStatus, TaxType};

pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            let err_resp = ErrorResponse {
                error: format!("Json parse error: {}", e),
            };
            (StatusCode::BAD_REQUEST, Json(err_resp)).into_response()
        })?;

        value.validate().map_err(|e| {
            let err_resp = ErrorResponse {
                error: format!("Validation error: {}", e),
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(err_resp)).into_response()
        })?;

        Ok(ValidatedJson(value))
    }
}

/// Accepts "HH:MM" (the UI form format) or "HH:MM:SS".
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .ok()
        .or_else(|| NaiveTime::parse_from_str(s, "%H:%M:%S").ok())
}

pub fn validate_time_of_day(s: &str) -> Result<(), ValidationError> {
    parse_time_of_day(s)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("invalid_time"))
}

pub fn validate_station_status(s: &str) -> Result<(), ValidationError> {
    StationStatus::parse(s)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("invalid_station_status"))
}

pub fn validate_tax_type(s: &str) -> Result<(), ValidationError> {
    TaxType::parse(s)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("invalid_tax_type"))
}

pub fn validate_tax_status(s: &str) -> Result<(), ValidationError> {
    TaxStatus::parse(s)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("invalid_tax_status"))
}

pub fn validate_webhook_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_webhook_url"))
    }
}

pub fn validate_image_mime(mime: &str) -> Result<(), ValidationError> {
    if mime.starts_with("image/") {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_image_mime"))
    }
}
