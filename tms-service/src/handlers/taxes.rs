//! Tax obligation CRUD and the status workflow.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::dtos::tax::{CreateTaxRequest, ListTaxesQuery, UpdateTaxRequest, UpdateTaxStatusRequest};
use crate::middleware::RequestUser;
use crate::models::{
    AuditAction, CreateTax, ListTaxesFilter, Tax, TaxStatus, TaxType, UpdateTax,
};
use crate::services::generator::format_amount_krw;
use crate::utils::validation::ValidatedJson;
use crate::AppState;
use service_core::error::AppError;

async fn ensure_station_exists(state: &AppState, station_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(id) = station_id {
        state
            .store
            .get_station(id)
            .await?
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Station not found: {id}")))?;
    }
    Ok(())
}

#[tracing::instrument(skip(state, user, request))]
pub async fn create_tax(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    ValidatedJson(request): ValidatedJson<CreateTaxRequest>,
) -> Result<(StatusCode, Json<Tax>), AppError> {
    let tax_type = TaxType::parse(&request.tax_type)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid tax type")))?;

    // A supplied status must belong to this type's workflow; otherwise
    // the obligation starts at the type's first status.
    let status = match request.status.as_deref().and_then(TaxStatus::parse) {
        Some(status) => {
            if !tax_type.workflow().contains(&status) {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Status {} is not part of the {} workflow",
                    status.as_str(),
                    tax_type.as_str()
                )));
            }
            status
        }
        None => tax_type.initial_status(),
    };

    ensure_station_exists(&state, request.station_id).await?;

    let tax = state
        .store
        .create_tax(&CreateTax {
            station_id: request.station_id,
            tax_type,
            tax_amount: request.tax_amount,
            due_date: request.due_date,
            tax_notice_number: request.tax_notice_number,
            tax_year: request.tax_year,
            tax_period: request.tax_period,
            notes: request.notes,
            status,
        })
        .await?;

    state
        .audit
        .record(
            &user,
            "taxes",
            AuditAction::Create,
            format!(
                "세금 등록: {} {}원",
                tax_type.label(),
                format_amount_krw(tax.tax_amount)
            ),
            "taxes",
            Some(tax.tax_id.to_string()),
            Some(json!({
                "tax_type": tax.tax_type,
                "tax_amount": tax.tax_amount,
                "due_date": tax.due_date,
                "status": tax.status,
            })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(tax)))
}

#[tracing::instrument(skip(state))]
pub async fn list_taxes(
    State(state): State<AppState>,
    Query(query): Query<ListTaxesQuery>,
) -> Result<Json<Vec<Tax>>, AppError> {
    let status = match query.status.as_deref() {
        Some(s) => Some(
            TaxStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid status filter")))?,
        ),
        None => None,
    };
    let tax_type = match query.tax_type.as_deref() {
        Some(s) => Some(
            TaxType::parse(s)
                .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid tax type filter")))?,
        ),
        None => None,
    };

    let filter = ListTaxesFilter {
        station_id: query.station_id,
        status,
        tax_type,
        due_after: query.due_after,
        due_before: query.due_before,
    };
    Ok(Json(state.store.list_taxes(&filter).await?))
}

/// General update. Status never changes here; it only moves through
/// the transition endpoint.
#[tracing::instrument(skip(state, user, request))]
pub async fn update_tax(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(tax_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTaxRequest>,
) -> Result<Json<Tax>, AppError> {
    let tax_type = TaxType::parse(&request.tax_type)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid tax type")))?;
    ensure_station_exists(&state, request.station_id).await?;

    let tax = state
        .store
        .update_tax(
            tax_id,
            &UpdateTax {
                station_id: request.station_id,
                tax_type,
                tax_amount: request.tax_amount,
                due_date: request.due_date,
                tax_notice_number: request.tax_notice_number,
                tax_year: request.tax_year,
                tax_period: request.tax_period,
                notes: request.notes,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tax not found")))?;

    state
        .audit
        .record(
            &user,
            "taxes",
            AuditAction::Update,
            format!(
                "세금 수정: {} {}원",
                tax_type.label(),
                format_amount_krw(tax.tax_amount)
            ),
            "taxes",
            Some(tax.tax_id.to_string()),
            Some(json!({
                "tax_type": tax.tax_type,
                "tax_amount": tax.tax_amount,
                "due_date": tax.due_date,
            })),
        )
        .await;

    Ok(Json(tax))
}

/// One workflow step at a time; anything else is a conflict.
#[tracing::instrument(skip(state, user, request))]
pub async fn update_tax_status(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(tax_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTaxStatusRequest>,
) -> Result<Json<Tax>, AppError> {
    let to = TaxStatus::parse(&request.status)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid tax status")))?;

    let current = state
        .store
        .get_tax(tax_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tax not found")))?;

    let tax_type = TaxType::from_string(&current.tax_type);
    let from = TaxStatus::from_string(&current.status);

    if !TaxStatus::can_transition(tax_type, from, to) {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Cannot move {} from {} to {}",
            tax_type.as_str(),
            from.as_str(),
            to.as_str()
        )));
    }

    let tax = state
        .store
        .update_tax_status(tax_id, to)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tax not found")))?;

    state
        .audit
        .record(
            &user,
            "taxes",
            AuditAction::Update,
            format!("세금 상태 변경: {} → {}", from.label(), to.label()),
            "taxes",
            Some(tax.tax_id.to_string()),
            Some(json!({ "from": from.as_str(), "to": to.as_str() })),
        )
        .await;

    Ok(Json(tax))
}

#[tracing::instrument(skip(state, user))]
pub async fn delete_tax(
    State(state): State<AppState>,
    Extension(user): Extension<RequestUser>,
    Path(tax_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let tax = state
        .store
        .get_tax(tax_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tax not found")))?;

    if !state.store.delete_tax(tax_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Tax not found")));
    }

    state
        .audit
        .record(
            &user,
            "taxes",
            AuditAction::Delete,
            format!(
                "세금 삭제: {} {}원",
                TaxType::from_string(&tax.tax_type).label(),
                format_amount_krw(tax.tax_amount)
            ),
            "taxes",
            Some(tax_id.to_string()),
            None,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
