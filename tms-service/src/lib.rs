//! Tax management service for EV charging-station operators.
//!
//! Tracks stations and their tax obligations, generates and dispatches
//! due-date reminders, sends webhook/email notifications, and extracts
//! tax notice data from images through a vision model.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::TmsConfig;
use crate::middleware::{identity_middleware, require_capability, Capability};
use crate::services::{
    AuditRecorder, EmailProvider, ExtractionService, ReminderDispatcher, ReminderGenerator, Store,
    WebhookProvider,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: TmsConfig,
    pub store: Arc<dyn Store>,
    pub webhook: Arc<dyn WebhookProvider>,
    pub email: Arc<dyn EmailProvider>,
    pub extraction: ExtractionService,
    pub audit: AuditRecorder,
    pub generator: ReminderGenerator,
    pub dispatcher: ReminderDispatcher,
    /// Single-flight guards for the batch jobs; see the job handlers.
    pub generator_lock: Arc<tokio::sync::Mutex<()>>,
    pub dispatcher_lock: Arc<tokio::sync::Mutex<()>>,
}

pub fn build_router(state: AppState) -> Router {
    // Each capability group carries its own guard; groups for the same
    // path merge by method.
    let station_view = Router::new()
        .route("/api/stations", get(handlers::stations::list_stations))
        .layer(from_fn_with_state(
            Capability::StationView,
            require_capability,
        ));

    let station_manage = Router::new()
        .route("/api/stations", post(handlers::stations::create_station))
        .route(
            "/api/stations/:station_id",
            put(handlers::stations::update_station).delete(handlers::stations::delete_station),
        )
        .layer(from_fn_with_state(
            Capability::StationManage,
            require_capability,
        ));

    let tax_view = Router::new()
        .route("/api/taxes", get(handlers::taxes::list_taxes))
        .layer(from_fn_with_state(Capability::TaxView, require_capability));

    let tax_manage = Router::new()
        .route("/api/taxes", post(handlers::taxes::create_tax))
        .route(
            "/api/taxes/:tax_id",
            put(handlers::taxes::update_tax).delete(handlers::taxes::delete_tax),
        )
        .route(
            "/api/taxes/:tax_id/status",
            patch(handlers::taxes::update_tax_status),
        )
        .layer(from_fn_with_state(Capability::TaxManage, require_capability));

    let reminder_view = Router::new()
        .route("/api/reminders", get(handlers::reminders::list_reminders))
        .route(
            "/api/reminders/upcoming",
            get(handlers::reminders::upcoming_taxes),
        )
        .layer(from_fn_with_state(
            Capability::ReminderView,
            require_capability,
        ));

    let reminder_manage = Router::new()
        .route(
            "/api/reminders",
            post(handlers::reminders::create_manual_reminder),
        )
        .route(
            "/api/reminders/:reminder_id",
            delete(handlers::reminders::delete_reminder),
        )
        .layer(from_fn_with_state(
            Capability::ReminderManage,
            require_capability,
        ));

    let settings = Router::new()
        .route(
            "/api/schedules",
            get(handlers::schedules::list_schedules).post(handlers::schedules::create_schedule),
        )
        .route(
            "/api/schedules/:schedule_id",
            put(handlers::schedules::update_schedule).delete(handlers::schedules::delete_schedule),
        )
        .route(
            "/api/channels",
            get(handlers::channels::list_channels).post(handlers::channels::create_channel),
        )
        .route(
            "/api/channels/:channel_id",
            put(handlers::channels::update_channel).delete(handlers::channels::delete_channel),
        )
        .route(
            "/api/recipients",
            get(handlers::recipients::list_recipients).post(handlers::recipients::create_recipient),
        )
        .route(
            "/api/recipients/:recipient_id",
            put(handlers::recipients::update_recipient)
                .delete(handlers::recipients::delete_recipient),
        )
        .layer(from_fn_with_state(
            Capability::SettingsManage,
            require_capability,
        ));

    let notification_send = Router::new()
        .route(
            "/api/notifications/webhook",
            post(handlers::notifications::send_webhook),
        )
        .route(
            "/api/notifications/email",
            post(handlers::notifications::send_email),
        )
        .layer(from_fn_with_state(
            Capability::NotificationSend,
            require_capability,
        ));

    let extraction_run = Router::new()
        .route(
            "/api/extraction/tax-notice",
            post(handlers::extraction::extract_tax_notice),
        )
        .route(
            "/api/extraction/station",
            post(handlers::extraction::extract_station),
        )
        .route(
            "/api/statistics/insights",
            post(handlers::extraction::tax_insights),
        )
        .layer(from_fn_with_state(
            Capability::ExtractionRun,
            require_capability,
        ));

    let report_view = Router::new()
        .route("/api/statistics", get(handlers::statistics::tax_statistics))
        .layer(from_fn_with_state(
            Capability::ReportView,
            require_capability,
        ));

    let audit_view = Router::new()
        .route("/api/audit-logs", get(handlers::audit::list_audit_logs))
        .layer(from_fn_with_state(Capability::AuditView, require_capability));

    let job_trigger = Router::new()
        .route(
            "/api/reminders/generate",
            post(handlers::jobs::generate_reminders),
        )
        .layer(from_fn_with_state(
            Capability::JobTrigger,
            require_capability,
        ));

    let api = station_view
        .merge(station_manage)
        .merge(tax_view)
        .merge(tax_manage)
        .merge(reminder_view)
        .merge(reminder_manage)
        .merge(settings)
        .merge(notification_send)
        .merge(extraction_run)
        .merge(report_view)
        .merge(audit_view)
        .merge(job_trigger)
        .layer(from_fn(identity_middleware));

    let allowed_origins: Vec<HeaderValue> = state
        .config
        .security
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().unwrap_or_else(|e| {
                tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", origin, e);
                HeaderValue::from_static("*")
            })
        })
        .collect();

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Scheduler-facing; guarded by the cron secret, not by identity.
        .route(
            "/api/reminders/dispatch",
            post(handlers::jobs::dispatch_reminders),
        )
        .merge(api)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::HeaderName::from_static("x-user-id"),
                    header::HeaderName::from_static("x-user-role"),
                    header::HeaderName::from_static("x-user-name"),
                    header::HeaderName::from_static("x-request-id"),
                    header::HeaderName::from_static("x-cron-key"),
                ]),
        )
}
