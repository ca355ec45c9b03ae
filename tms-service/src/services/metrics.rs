//! Prometheus metrics for tms-service.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Reminder rows produced by the generator, by outcome.
pub static REMINDERS_GENERATED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tms_reminders_generated_total",
        "Total reminders considered by the generator",
        &["outcome"] // created, skipped
    )
    .expect("Failed to register reminders_generated_total")
});

/// Webhook deliveries attempted by the dispatcher and test sends.
pub static DISPATCH_MESSAGES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tms_dispatch_messages_total",
        "Total webhook messages by flow and status",
        &["flow", "status"] // flow: schedule, manual, adhoc; status: sent, failed
    )
    .expect("Failed to register dispatch_messages_total")
});

/// Outbound provider API calls.
pub static PROVIDER_CALLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tms_provider_calls_total",
        "Total provider API calls by provider and status",
        &["provider", "status"]
    )
    .expect("Failed to register provider_calls_total")
});

/// Vision extraction requests by kind and outcome.
pub static EXTRACTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tms_extractions_total",
        "Total vision extractions by kind and outcome",
        &["kind", "outcome"] // outcome: ok, degraded, error
    )
    .expect("Failed to register extractions_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tms_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize metrics. Installs the HTTP-layer recorder once per
/// process and forces the lazy registrations, so repeated calls are
/// safe.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    });

    Lazy::force(&REMINDERS_GENERATED_TOTAL);
    Lazy::force(&DISPATCH_MESSAGES_TOTAL);
    Lazy::force(&PROVIDER_CALLS_TOTAL);
    Lazy::force(&EXTRACTIONS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Render all metrics in Prometheus text format: the HTTP-layer
/// recorder output followed by the default registry.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    if let Ok(rendered) = encoder.encode_to_string(&metric_families) {
        output.push_str(&rendered);
    }

    output
}

/// Record a provider API call.
pub fn record_provider_call(provider: &str, status: &str) {
    PROVIDER_CALLS_TOTAL
        .with_label_values(&[provider, status])
        .inc();
}

/// Record a webhook delivery attempt.
pub fn record_dispatch(flow: &str, status: &str) {
    DISPATCH_MESSAGES_TOTAL
        .with_label_values(&[flow, status])
        .inc();
}
