use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct SessionsResponse {
    sessions: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temporal_error: Option<String>,
}

/// `GET /sessions` (§4.5, §6). Always 200: a failed external query is
/// surfaced as a sibling `temporal_error` field, never as an error status.
pub async fn list_sessions(State(state): State<AppState>) -> Json<Value> {
    let listing = state.registry.list().await;
    let sessions = listing
        .sessions
        .into_iter()
        .map(|meta| serde_json::to_value(meta).unwrap_or(Value::Null))
        .collect();
    Json(serde_json::to_value(SessionsResponse {
        sessions,
        temporal_error: listing.temporal_error,
    }).unwrap_or(Value::Null))
}
