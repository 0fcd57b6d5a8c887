//! Signal/cancel dispatch (§4.7 `/signal/{id}`, `/cancel/{id}`).
//!
//! The workflow engine that actually owns signal/cancellation primitives is
//! out of scope for this crate (§1); `WorkflowControl` is the seam the
//! embedding process implements over its live workflow handles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    HumanInputAnswer,
    Pause,
    Resume,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalRequest {
    pub signal: SignalKind,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Error raised by a control operation. `Unknown` maps to 404; anything
/// else is the embedder's business and maps to a 400 with its message.
#[derive(Debug)]
pub enum ControlError {
    UnknownSession,
    Rejected(String),
}

#[async_trait::async_trait]
pub trait WorkflowControl: Send + Sync {
    async fn signal(&self, session_id: &str, request: SignalRequest) -> Result<(), ControlError>;
    async fn cancel(&self, session_id: &str) -> Result<(), ControlError>;
}

/// A control backend with no live workflows — every session is unknown.
/// Used when the gateway runs standalone with no embedding framework.
pub struct NoWorkflows;

#[async_trait::async_trait]
impl WorkflowControl for NoWorkflows {
    async fn signal(&self, _session_id: &str, _request: SignalRequest) -> Result<(), ControlError> {
        Err(ControlError::UnknownSession)
    }

    async fn cancel(&self, _session_id: &str) -> Result<(), ControlError> {
        Err(ControlError::UnknownSession)
    }
}
