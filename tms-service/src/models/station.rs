//! Charging station model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Operational status of a charging station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    Operating,
    Planned,
    Terminated,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StationStatus::Operating => "operating",
            StationStatus::Planned => "planned",
            StationStatus::Terminated => "terminated",
        }
    }

    /// Strict parse for request input.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "operating" => Some(StationStatus::Operating),
            "planned" => Some(StationStatus::Planned),
            "terminated" => Some(StationStatus::Terminated),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StationStatus::Operating => "운영중",
            StationStatus::Planned => "운영예정",
            StationStatus::Terminated => "운영종료",
        }
    }
}

/// Charging station record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Station {
    pub station_id: Uuid,
    pub station_name: String,
    pub location: String,
    pub address: Option<String>,
    pub status: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a station.
#[derive(Debug, Clone)]
pub struct CreateStation {
    pub station_name: String,
    pub location: String,
    pub address: Option<String>,
    pub status: StationStatus,
}

/// Input for replacing a station.
#[derive(Debug, Clone)]
pub struct UpdateStation {
    pub station_name: String,
    pub location: String,
    pub address: Option<String>,
    pub status: StationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_round_trip() {
        for status in [
            StationStatus::Operating,
            StationStatus::Planned,
            StationStatus::Terminated,
        ] {
            assert_eq!(StationStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(StationStatus::parse("maintenance"), None);
        assert_eq!(StationStatus::parse(""), None);
    }
}
