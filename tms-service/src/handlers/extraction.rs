//! Vision extraction endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::dtos::extraction::{
    ExtractImageRequest, ExtractionResponse, InsightsResponse, TaxNoticeData,
};
use crate::models::ListTaxesFilter;
use crate::services::clock::kst_today;
use crate::services::providers::ImagePart;
use crate::services::statistics::tax_aggregates;
use crate::utils::validation::ValidatedJson;
use crate::AppState;
use service_core::error::AppError;

/// OCR for an uploaded tax notice. Extraction quality problems are
/// reported inside the payload, not as errors.
#[tracing::instrument(skip(state, request))]
pub async fn extract_tax_notice(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ExtractImageRequest>,
) -> Json<ExtractionResponse<TaxNoticeData>> {
    let image = ImagePart {
        mime_type: request.mime_type,
        data_base64: request.image_base64,
    };
    let data = state.extraction.extract_tax_notice(&image).await;
    Json(ExtractionResponse {
        success: true,
        data,
    })
}

/// Station signage analysis. Unlike the notice OCR, failures here are
/// real errors, answered as `{success: false, error}`.
#[tracing::instrument(skip(state, request))]
pub async fn extract_station(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ExtractImageRequest>,
) -> Response {
    let image = ImagePart {
        mime_type: request.mime_type,
        data_base64: request.image_base64,
    };
    match state.extraction.extract_station(&image).await {
        Ok(data) => Json(ExtractionResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "station image analysis failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "이미지 분석 중 오류가 발생했습니다."
                })),
            )
                .into_response()
        }
    }
}

/// Plain-text commentary over the current obligation counts.
#[tracing::instrument(skip(state))]
pub async fn tax_insights(
    State(state): State<AppState>,
) -> Result<Json<InsightsResponse>, AppError> {
    let taxes = state.store.list_taxes(&ListTaxesFilter::default()).await?;
    let aggregates = tax_aggregates(&taxes, kst_today(Utc::now()));
    let analysis = state.extraction.generate_insights(&aggregates).await?;
    Ok(Json(InsightsResponse { analysis }))
}
