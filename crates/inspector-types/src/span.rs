use crate::attr::AttributeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Span kind, defaulting to `Internal` when unspecified by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanKind {
    #[default]
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

/// Span completion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    #[default]
    Unset,
    Ok,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanStatus {
    pub code: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A point-in-time event recorded within a span's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanEvent {
    pub name: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub attributes: AttributeMap,
}

/// A reference from this span to another span, possibly in a different trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanLink {
    pub trace_id: String,
    pub span_id: String,
    #[serde(default)]
    pub attributes: AttributeMap,
}

/// One structured span record, the unit written to a trace file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub name: String,
    pub kind: SpanKind,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SpanStatus,
    #[serde(default)]
    pub attributes: AttributeMap,
    #[serde(default)]
    pub events: Vec<SpanEvent>,
    #[serde(default)]
    pub links: Vec<SpanLink>,
}

impl Span {
    /// Does this span currently accept attribute/event mutation?
    /// Mirrors the "no-op on non-recording span" rule in C3: once `end_time`
    /// is set the span is closed and enrichment must be a no-op.
    pub fn is_recording(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn name_is_valid(&self) -> bool {
        self.name.chars().count() <= 256
    }

    /// `end_time >= start_time` when present (Data Model invariant iv).
    pub fn end_time_is_valid(&self) -> bool {
        match self.end_time {
            Some(end) => end >= self.start_time,
            None => true,
        }
    }

    /// The `session.id` attribute value, falling back to the sentinel used
    /// by the file exporter when grouping spans into files.
    pub fn session_id(&self) -> &str {
        match self.attributes.get("session.id") {
            Some(crate::attr::AttributeValue::Str(s)) => s.as_str(),
            _ => "unknown",
        }
    }
}
