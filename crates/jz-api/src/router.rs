use axum::{
    Router,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::{
    metrics::{metrics_handler, track_metrics},
    middleware::{request_id_middleware, session_middleware},
    quiz, score,
    state::ApiState,
    topic,
};

pub fn router(state: ApiState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .merge(topic::routes())
        .merge(quiz::routes())
        .merge(score::routes());

    if state.metrics.is_some() {
        router = router.route("/metrics", get(metrics_handler));
    }

    // Layers run bottom to top: request id first, sessions last
    router
        .fallback(handler_404)
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
