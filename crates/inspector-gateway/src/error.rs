//! Unified HTTP error type (§7): every request-scoped failure maps to a
//! precise status code and a structured `{error: {kind, message}}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum InspectorError {
    /// Invalid session-id, bad Range, invalid signal — 4xx.
    Validation(String),
    /// Missing trace or unknown session — 404. Per §4.8, this is also
    /// used for path-traversal attempts, deliberately indistinguishable
    /// from an ordinary missing file to avoid enumeration.
    NotFound(String),
    /// A requested byte range could not be satisfied — 416.
    RangeNotSatisfiable(String),
}

impl InspectorError {
    fn kind(&self) -> &'static str {
        match self {
            InspectorError::Validation(_) => "ValidationError",
            InspectorError::NotFound(_) => "NotFound",
            InspectorError::RangeNotSatisfiable(_) => "ValidationError",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            InspectorError::Validation(_) => StatusCode::BAD_REQUEST,
            InspectorError::NotFound(_) => StatusCode::NOT_FOUND,
            InspectorError::RangeNotSatisfiable(_) => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            InspectorError::Validation(m) | InspectorError::NotFound(m) | InspectorError::RangeNotSatisfiable(m) => m,
        }
    }
}

impl IntoResponse for InspectorError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "kind": self.kind(),
                "message": self.message(),
            }
        }));
        (status, body).into_response()
    }
}
