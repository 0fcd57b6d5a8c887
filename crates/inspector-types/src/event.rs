use crate::session::{Engine, SessionStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The variants of the lifecycle/event bus event, discriminated by `type`.
/// Mirrors the Data Model §3 `Event (E)` entity; unknown future fields on
/// the wire are tolerated via `#[serde(default)]` on optional members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    SessionStarted {
        session_id: String,
        engine: Engine,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
    SessionPaused {
        session_id: String,
        signal_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<Value>,
    },
    SessionResumed {
        session_id: String,
        signal_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    SessionFinished {
        session_id: String,
        status: SessionStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<i64>,
    },
    Heartbeat {
        session_id: String,
        llm_calls_delta: u64,
        tokens_delta: u64,
        tool_calls_delta: u64,
        current_span_count: u64,
    },
    Progress {
        session_id: String,
        operation_id: String,
        percent: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    WaitingOnSignal {
        session_id: String,
        signal_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<Value>,
    },
    /// Recorded once per exporter degradation transition (§4.4/§7 `StorageFull`).
    DiskSpaceLow { traces_dir: String },
    /// Recorded once when a peer process holds the advisory lock (§4.4 `LockHeld`).
    ExporterDisabled { reason: String },
}

impl EventPayload {
    /// The session-id this event pertains to, when applicable.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            EventPayload::SessionStarted { session_id, .. }
            | EventPayload::SessionPaused { session_id, .. }
            | EventPayload::SessionResumed { session_id, .. }
            | EventPayload::SessionFinished { session_id, .. }
            | EventPayload::Heartbeat { session_id, .. }
            | EventPayload::Progress { session_id, .. }
            | EventPayload::WaitingOnSignal { session_id, .. } => Some(session_id.as_str()),
            EventPayload::DiskSpaceLow { .. } | EventPayload::ExporterDisabled { .. } => None,
        }
    }
}

/// A wire-ready event: the payload plus the bus-assigned monotonic id and
/// timestamp common to all variants (§3 Event common fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}
