//! Prometheus metrics

use axum::extract::State;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;
use crate::ServerError;

/// Install the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))
}

/// Count a pacing run start.
pub fn record_dispatch_started() {
    metrics::counter!("dialer_runs_started_total").increment(1);
}

/// Count a webhook delivery by processing result.
pub fn record_webhook(success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("dialer_webhooks_total", "result" => result).increment(1);
}

/// Prometheus exposition endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    match state.metrics {
        Some(handle) => handle.render(),
        None => String::new(),
    }
}
