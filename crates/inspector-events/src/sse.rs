//! Server-Sent-Events wire framing (§4.6): pure byte-formatting, kept
//! separate from the HTTP transport so the gateway crate only has to
//! stitch these strings into a streaming response body.

use inspector_types::StoredEvent;

/// The first bytes sent on every new SSE connection, before any event.
pub const INITIAL_BYTES: &str = "retry: 2000\n\n";

/// A zero-payload comment line, sent periodically to keep intermediaries
/// (proxies, load balancers) from idling the connection out.
pub const HEARTBEAT_COMMENT: &str = ": heartbeat\n\n";

/// Frame one event per §4.6:
/// ```text
/// id: <n>
/// event: message
/// data: <JSON of the event>
/// <blank line>
/// ```
pub fn frame_event(event: &StoredEvent) -> String {
    let data = serde_json::to_string(event).unwrap_or_else(|_| "null".to_string());
    format!("id: {}\nevent: message\ndata: {}\n\n", event.event_id, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_types::EventPayload;

    #[test]
    fn frames_id_event_and_data_lines() {
        let event = StoredEvent {
            event_id: 42,
            timestamp: chrono::Utc::now(),
            payload: EventPayload::Progress {
                session_id: "abcdef".to_string(),
                operation_id: "op-1".to_string(),
                percent: 50.0,
                message: None,
            },
        };
        let framed = frame_event(&event);
        assert!(framed.starts_with("id: 42\nevent: message\ndata: "));
        assert!(framed.ends_with("\n\n"));
        assert!(framed.contains("\"type\":\"progress\""));
    }
}
