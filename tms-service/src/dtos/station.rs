use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::validate_station_status;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStationRequest {
    #[validate(length(min = 1, message = "Station name is required"))]
    pub station_name: String,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    pub address: Option<String>,

    #[validate(custom(function = "validate_station_status"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStationRequest {
    #[validate(length(min = 1, message = "Station name is required"))]
    pub station_name: String,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    pub address: Option<String>,

    #[validate(custom(function = "validate_station_status"))]
    pub status: String,
}
