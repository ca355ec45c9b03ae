use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional due-date window for the statistics rollup.
#[derive(Debug, Deserialize, Default)]
pub struct StatisticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TypeRollup {
    pub tax_type: String,
    pub label: String,
    pub count: usize,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusRollup {
    pub status: String,
    pub label: String,
    pub count: usize,
    pub amount: i64,
}

/// Due amounts bucketed by ISO month ("YYYY-MM"), ascending.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthRollup {
    pub month: String,
    pub count: usize,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StationRollup {
    pub station_id: Option<Uuid>,
    pub station_name: String,
    pub count: usize,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct TaxStatistics {
    pub total_taxes: usize,
    pub total_amount: i64,
    pub overdue_taxes: usize,
    pub completed_tax_sum: i64,
    pub by_type: Vec<TypeRollup>,
    pub by_status: Vec<StatusRollup>,
    pub by_month: Vec<MonthRollup>,
    pub by_station: Vec<StationRollup>,
}
