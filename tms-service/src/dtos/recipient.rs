use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipientRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipientRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub name: Option<String>,
    pub is_active: bool,
}
