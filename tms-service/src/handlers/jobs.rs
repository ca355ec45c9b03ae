//! Batch job triggers for external schedulers.
//!
//! These answer `{success: false, error}` on failure instead of the
//! usual error body; schedulers key off the `success` flag.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::dtos::reminder::{DispatchResponse, GenerateRemindersResponse};
use crate::AppState;

fn job_error(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn generate_reminders(State(state): State<AppState>) -> Response {
    // Single-flight: concurrent triggers wait, then sweep again.
    let _guard = state.generator_lock.lock().await;

    match state.generator.run(Utc::now()).await {
        Ok(outcome) => Json(GenerateRemindersResponse {
            success: true,
            created: outcome.created,
            skipped: outcome.skipped,
            reason: outcome.reason,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "reminder generation failed");
            job_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct DispatchQuery {
    pub key: Option<String>,
}

/// Cron secret check. Enforced only when a secret is configured; the
/// key arrives as an `x-cron-key` header or `key` query parameter.
fn cron_key_matches(secret: Option<&str>, headers: &HeaderMap, query: &DispatchQuery) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    let provided = headers
        .get("x-cron-key")
        .and_then(|v| v.to_str().ok())
        .or(query.key.as_deref());
    provided == Some(secret)
}

#[tracing::instrument(skip(state, headers, query))]
pub async fn dispatch_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DispatchQuery>,
) -> Response {
    if !cron_key_matches(state.config.jobs.cron_secret.as_deref(), &headers, &query) {
        return job_error(StatusCode::UNAUTHORIZED, "Unauthorized".to_string());
    }

    let _guard = state.dispatcher_lock.lock().await;

    let now = Utc::now();
    match state.dispatcher.run(now).await {
        Ok(outcome) => Json(DispatchResponse {
            success: true,
            dispatched: outcome.dispatched,
            dispatched_manual: outcome.dispatched_manual,
            now,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "reminder dispatch failed");
            job_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(key: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(key, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_no_secret_accepts_anything() {
        assert!(cron_key_matches(
            None,
            &HeaderMap::new(),
            &DispatchQuery::default()
        ));
    }

    #[test]
    fn test_header_key_checked() {
        let secret = Some("s3cret");
        assert!(cron_key_matches(
            secret,
            &headers_with("x-cron-key", "s3cret"),
            &DispatchQuery::default()
        ));
        assert!(!cron_key_matches(
            secret,
            &headers_with("x-cron-key", "wrong"),
            &DispatchQuery::default()
        ));
    }

    #[test]
    fn test_query_key_fallback() {
        let secret = Some("s3cret");
        let query = DispatchQuery {
            key: Some("s3cret".to_string()),
        };
        assert!(cron_key_matches(secret, &HeaderMap::new(), &query));
        assert!(!cron_key_matches(
            secret,
            &HeaderMap::new(),
            &DispatchQuery::default()
        ));
    }

    #[test]
    fn test_header_wins_over_query() {
        // A wrong header is not rescued by a correct query key.
        let secret = Some("s3cret");
        let query = DispatchQuery {
            key: Some("s3cret".to_string()),
        };
        assert!(!cron_key_matches(
            secret,
            &headers_with("x-cron-key", "wrong"),
            &query
        ));
    }
}
