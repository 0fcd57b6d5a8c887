use crate::control::{ControlError, SignalRequest};
use crate::error::InspectorError;
use crate::session_id;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

/// `POST /signal/{session_id}` (§4.7, §6, §8 scenario 6).
pub async fn send_signal(
    State(state): State<AppState>,
    Path(requested_session_id): Path<String>,
    Json(request): Json<SignalRequest>,
) -> Result<Json<Value>, InspectorError> {
    if !session_id::is_valid(&requested_session_id) {
        return Err(InspectorError::Validation("invalid session id".to_string()));
    }
    match state.control.signal(&requested_session_id, request).await {
        Ok(()) => Ok(Json(json!({ "ok": true }))),
        Err(ControlError::UnknownSession) => Err(InspectorError::NotFound(format!(
            "no live session {requested_session_id}"
        ))),
        Err(ControlError::Rejected(reason)) => Err(InspectorError::Validation(reason)),
    }
}

/// `POST /cancel/{session_id}` (§4.7).
pub async fn cancel_session(
    State(state): State<AppState>,
    Path(requested_session_id): Path<String>,
) -> Result<Json<Value>, InspectorError> {
    if !session_id::is_valid(&requested_session_id) {
        return Err(InspectorError::Validation("invalid session id".to_string()));
    }
    match state.control.cancel(&requested_session_id).await {
        Ok(()) => Ok(Json(json!({ "ok": true }))),
        Err(ControlError::UnknownSession) => Err(InspectorError::NotFound(format!(
            "no live session {requested_session_id}"
        ))),
        Err(ControlError::Rejected(reason)) => Err(InspectorError::Validation(reason)),
    }
}
