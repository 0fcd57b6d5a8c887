//! Shared data model for the inspector sidecar: sessions, spans, attributes
//! and lifecycle events. No I/O lives here — every other crate in the
//! workspace builds on these schemas.

pub mod attr;
pub mod error;
pub mod event;
pub mod ids;
pub mod session;
pub mod span;

pub use attr::{AttributeMap, AttributeValue, MAX_JSON_ATTR_BYTES, set_json_attr};
pub use error::{Error, Result};
pub use event::{EventPayload, StoredEvent};
pub use ids::{validate_session_id, validate_span_id, validate_trace_id};
pub use session::{Engine, SessionMeta, SessionStatus};
pub use span::{Span, SpanEvent, SpanKind, SpanLink, SpanStatus, StatusCode};
