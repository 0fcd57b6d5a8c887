use crate::routes;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Default hard timeout for non-streaming endpoints (§5).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the full router, all routes mounted under `/_inspector` (§4.7).
/// `/events` and `/trace/{id}` are streaming endpoints and intentionally
/// sit outside the blanket request timeout.
pub fn build_router(state: AppState) -> Router {
    let timed = Router::new()
        .route("/health", get(routes::health::health))
        .route("/sessions", get(routes::sessions::list_sessions))
        .route("/signal/{session_id}", post(routes::signal::send_signal))
        .route("/cancel/{session_id}", post(routes::signal::cancel_session))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    let streaming = Router::new()
        .route("/trace/{session_id}", get(routes::trace::get_trace))
        .route("/events", get(routes::events::stream_events));

    Router::new()
        .nest("/_inspector", timed.merge(streaming))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
