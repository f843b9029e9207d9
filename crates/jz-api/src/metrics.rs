//! Prometheus metrics: HTTP request counters plus quiz counters.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

use crate::state::ApiState;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("UUID pattern is valid")
});
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+\b").expect("number pattern is valid"));

/// Install the global Prometheus recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Middleware recording request counts and durations per route
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let in_flight = gauge!("http_requests_in_flight", "method" => method.clone(), "path" => path.clone());
    in_flight.increment(1.0);

    let response = next.run(req).await;

    in_flight.decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Replace ids in a path with `:id` to keep label cardinality low
fn normalize_path(path: &str) -> String {
    let path = UUID_RE.replace_all(path, ":id");
    NUMBER_RE.replace_all(&path, "/:id").into_owned()
}

/// Handler for `/metrics`
pub async fn metrics_handler(State(state): State<ApiState>) -> Response {
    match state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A quiz reached a new stage
pub fn record_quiz_transition(stage: &'static str) {
    counter!("quiz_transitions_total", "stage" => stage).increment(1);
}

/// A quiz was aborted, either on a rejected token or a too small event pool
pub fn record_quiz_abort(reason: &'static str) {
    counter!("quiz_aborts_total", "reason" => reason).increment(1);
}

pub fn record_score_persisted() {
    counter!("scores_persisted_total").increment(1);
}
