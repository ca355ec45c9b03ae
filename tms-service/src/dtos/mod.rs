pub mod channel;
pub mod extraction;
pub mod notification;
pub mod recipient;
pub mod reminder;
pub mod schedule;
pub mod station;
pub mod statistics;
pub mod tax;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
