use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::validate_webhook_url;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, message = "Channel name is required"))]
    pub channel_name: String,

    #[validate(custom(function = "validate_webhook_url"))]
    pub webhook_url: String,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChannelRequest {
    #[validate(length(min = 1, message = "Channel name is required"))]
    pub channel_name: String,

    #[validate(custom(function = "validate_webhook_url"))]
    pub webhook_url: String,

    pub is_active: bool,
}
