//! Obligation statistics rollup.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use crate::dtos::statistics::{StatisticsQuery, TaxStatistics};
use crate::models::ListTaxesFilter;
use crate::services::clock::kst_today;
use crate::services::statistics::compute_statistics;
use crate::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state))]
pub async fn tax_statistics(
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<TaxStatistics>, AppError> {
    let filter = ListTaxesFilter {
        due_after: query.start_date,
        due_before: query.end_date,
        ..Default::default()
    };
    let taxes = state.store.list_taxes(&filter).await?;

    let station_names: HashMap<Uuid, String> = state
        .store
        .list_stations()
        .await?
        .into_iter()
        .map(|s| (s.station_id, s.station_name))
        .collect();

    let today = kst_today(Utc::now());
    Ok(Json(compute_statistics(&taxes, &station_names, today)))
}
