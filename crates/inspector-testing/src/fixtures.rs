//! Span and trace-file builders shared across crate test suites.

use inspector_export::FileSpanExporter;
use inspector_types::{AttributeMap, AttributeValue, Span, SpanKind, SpanStatus};
use std::path::Path;

/// Build a single finished (or still-running, if `ended` is false) span
/// tagged with `session_id`, suitable for feeding straight into
/// [`FileSpanExporter::export`].
pub fn span(session_id: &str, name: &str, ended: bool) -> Span {
    let mut attributes = AttributeMap::new();
    attributes.insert("session.id".to_string(), AttributeValue::Str(session_id.to_string()));
    let start = chrono::Utc::now();
    Span {
        trace_id: "a".repeat(32),
        span_id: "b".repeat(16),
        parent_span_id: None,
        name: name.to_string(),
        kind: SpanKind::Internal,
        start_time: start,
        end_time: if ended { Some(start) } else { None },
        status: SpanStatus::default(),
        attributes,
        events: Vec::new(),
        links: Vec::new(),
    }
}

/// Write one finished session's worth of spans straight to a gzipped
/// trace file under `traces_dir`, using the real exporter so the
/// resulting file has exactly the shape a reader would see in production.
pub fn write_session_trace(traces_dir: &Path, session_id: &str, span_names: &[&str]) {
    let exporter = FileSpanExporter::new(traces_dir, Box::new(()));
    let spans: Vec<Span> = span_names
        .iter()
        .map(|name| span(session_id, name, true))
        .collect();
    exporter.export(&spans);
    exporter.shutdown().expect("fixture export should not fail");
}

/// A small corpus of independent sessions, each with one root span,
/// useful for registry/gateway tests that need more than one listing
/// entry.
pub fn write_sample_corpus(traces_dir: &Path, session_ids: &[&str]) {
    for session_id in session_ids {
        write_session_trace(traces_dir, session_id, &["root"]);
    }
}
