//! Charging station CRUD.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::dtos::station::{CreateStationRequest, UpdateStationRequest};
use crate::middleware::RequestUser;
use crate::models::{AuditAction, CreateStation, Station, StationStatus, UpdateStation};
use crate::utils::validation::ValidatedJson;
use crate::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state, user, request))]
pub async fn create_station(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    ValidatedJson(request): ValidatedJson<CreateStationRequest>,
) -> Result<(StatusCode, Json<Station>), AppError> {
    let status = request
        .status
        .as_deref()
        .and_then(StationStatus::parse)
        .unwrap_or(StationStatus::Operating);

    let station = state
        .store
        .create_station(&CreateStation {
            station_name: request.station_name,
            location: request.location,
            address: request.address,
            status,
        })
        .await?;

    state
        .audit
        .record(
            &user,
            "stations",
            AuditAction::Create,
            format!("충전소 등록: {}", station.station_name),
            "charging_stations",
            Some(station.station_id.to_string()),
            Some(json!({
                "station_name": station.station_name,
                "location": station.location,
                "status": station.status,
            })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(station)))
}

#[tracing::instrument(skip(state))]
pub async fn list_stations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Station>>, AppError> {
    Ok(Json(state.store.list_stations().await?))
}

#[tracing::instrument(skip(state, user, request))]
pub async fn update_station(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(station_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateStationRequest>,
) -> Result<Json<Station>, AppError> {
    let status = StationStatus::parse(&request.status)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid station status")))?;

    let station = state
        .store
        .update_station(
            station_id,
            &UpdateStation {
                station_name: request.station_name,
                location: request.location,
                address: request.address,
                status,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Station not found")))?;

    state
        .audit
        .record(
            &user,
            "stations",
            AuditAction::Update,
            format!("충전소 수정: {}", station.station_name),
            "charging_stations",
            Some(station.station_id.to_string()),
            Some(json!({
                "station_name": station.station_name,
                "location": station.location,
                "status": station.status,
            })),
        )
        .await;

    Ok(Json(station))
}

/// Deletion is blocked while obligations still reference the station.
#[tracing::instrument(skip(state, user))]
pub async fn delete_station(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(station_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let station = state
        .store
        .get_station(station_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Station not found")))?;

    let tax_count = state.store.count_taxes_for_station(station_id).await?;
    if tax_count > 0 {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Station has {} tax obligations; delete or reassign them first",
            tax_count
        )));
    }

    if !state.store.delete_station(station_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Station not found")));
    }

    state
        .audit
        .record(
            &user,
            "stations",
            AuditAction::Delete,
            format!("충전소 삭제: {}", station.station_name),
            "charging_stations",
            Some(station_id.to_string()),
            None,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
