//! Ad hoc notification sends for verifying channel and recipient
//! settings.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use tracing::warn;

use crate::dtos::notification::{
    SendEmailRequest, SendEmailResponse, SendWebhookRequest, SendWebhookResponse,
};
use crate::services::clock::kst_civil_now;
use crate::utils::validation::ValidatedJson;
use crate::AppState;
use service_core::error::AppError;

fn kst_timestamp() -> String {
    let (date, time) = kst_civil_now(Utc::now());
    format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M:%S"))
}

/// Broadcasts a text message to explicit URLs plus referenced active
/// channels, deduplicated.
#[tracing::instrument(skip(state, request))]
pub async fn send_webhook(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SendWebhookRequest>,
) -> Result<Json<SendWebhookResponse>, AppError> {
    let mut urls: Vec<String> = request.webhook_urls.unwrap_or_default();

    let channel_ids = request.channel_ids.unwrap_or_default();
    if !channel_ids.is_empty() {
        let channels = state.store.list_active_channels_by_ids(&channel_ids).await?;
        urls.extend(channels.into_iter().map(|c| c.webhook_url));
    }

    let mut seen = HashSet::new();
    let urls: Vec<String> = urls
        .into_iter()
        .filter(|u| u.starts_with("http"))
        .filter(|u| seen.insert(u.clone()))
        .collect();

    if urls.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No webhook URLs provided"
        )));
    }

    let text = match request.text.as_deref() {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => format!("TMS 테스트 메시지 ({})", kst_timestamp()),
    };

    let mut sent = 0;
    let mut failed = 0;
    for url in &urls {
        match state.webhook.post_text(url, &text).await {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!(error = %e, "webhook test send failed");
                failed += 1;
            }
        }
    }

    Ok(Json(SendWebhookResponse {
        success: true,
        sent,
        failed,
    }))
}

/// Sends a test email to every active recipient. Provider rejections
/// come back as `{success: false, error}` for the settings screen.
#[tracing::instrument(skip(state, request))]
pub async fn send_email(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SendEmailRequest>,
) -> Result<Response, AppError> {
    let recipients = state.store.list_active_recipients().await?;
    if recipients.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No active email recipients"
        )));
    }
    let addresses: Vec<String> = recipients.into_iter().map(|r| r.email).collect();

    let timestamp = kst_timestamp();
    let body_text = match request.content.as_deref() {
        Some(content) => content.to_string(),
        None => format!(
            "TMS 시스템에서 보내는 테스트 이메일입니다.\n\n발송 시간: {timestamp}\n\n이 이메일을 받으셨다면 이메일 알림 시스템이 정상적으로 작동하고 있습니다."
        ),
    };
    let body_html = match request.content.as_deref() {
        Some(content) => format!("<p>{}</p>", content.replace('\n', "<br>")),
        None => format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">TMS 테스트 이메일</h2>
  <p>TMS 시스템에서 보내는 테스트 이메일입니다.</p>
  <p><strong>발송 시간:</strong> {timestamp}</p>
  <p>이 이메일을 받으셨다면 이메일 알림 시스템이 정상적으로 작동하고 있습니다.</p>
  <hr style="margin: 20px 0; border: none; border-top: 1px solid #eee;">
  <p style="color: #666; font-size: 12px;">TMS 세금 관리 시스템</p>
</div>"#
        ),
    };

    if let Err(e) = state
        .email
        .send_broadcast(&addresses, &request.subject, &body_text, &body_html)
        .await
    {
        warn!(error = %e, "email broadcast failed");
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": e.to_string() })),
        )
            .into_response());
    }

    Ok(Json(SendEmailResponse {
        success: true,
        message: "Email sent successfully".to_string(),
    })
    .into_response())
}
