//! Span enrichment (C3): turn a hook emission into attributes on the
//! *currently active* span of the emitting code path.
//!
//! The agent framework that owns span lifetimes is out of scope for this
//! crate (§1), so enrichment is expressed against a small [`RecordingSpan`]
//! trait the framework implements over its own span handle, rather than
//! against a concrete span type. This mirrors the source's reliance on an
//! ambient OpenTelemetry-style "current span" accessor: here the caller
//! passes the handle explicitly, which is the idiomatic analogue in a
//! language without implicit context managers.

use inspector_context as context;
use inspector_types::attr::{set_json_attr, AttributeValue, MAX_JSON_ATTR_BYTES};
use serde_json::Value;

use crate::catalogue::{family, phase, HookPayload};

/// A handle to the span currently recording on the emitting code path.
/// Implemented by the agent framework's span representation; this crate
/// only ever calls `is_recording` and `set_attribute` on it.
pub trait RecordingSpan {
    /// Whether the span still accepts attribute mutation (§4.3 rule 3).
    fn is_recording(&self) -> bool;
    fn set_attribute(&self, key: &str, value: AttributeValue);
}

/// Set a scalar attribute, respecting the no-op-when-not-recording rule.
fn set_scalar(span: &dyn RecordingSpan, key: &str, value: impl Into<AttributeValue>) {
    if span.is_recording() {
        span.set_attribute(key, value.into());
    }
}

/// Serialize `value` under `key` (which must end in `_json`) applying the
/// truncation rule from §4.3 rule 2, respecting the no-op rule.
fn set_json(span: &dyn RecordingSpan, key: &str, value: &Value) {
    if !span.is_recording() {
        return;
    }
    let mut attrs = inspector_types::AttributeMap::new();
    set_json_attr(&mut attrs, key, value);
    for (k, v) in attrs {
        span.set_attribute(&k, v);
    }
}

/// Always-set correlation attribute: `session.id = context.get()`, only
/// when a session-id is actually bound (never the `"unknown"` sentinel).
fn set_session_correlation(span: &dyn RecordingSpan) {
    let id = context::get();
    if &*id != context::UNKNOWN {
        set_scalar(span, "session.id", id.to_string());
    }
}

/// Translate one hook emission into span attributes. `family`/`phase` are
/// the dotted components documented in the hook catalogue; unknown
/// combinations fall through to a namespaced catch-all so forward
/// compatibility doesn't require touching this dispatcher.
pub fn enrich(span: &dyn RecordingSpan, hook_family: &str, hook_phase: &str, payload: &HookPayload) {
    if !span.is_recording() {
        return;
    }
    set_session_correlation(span);
    match hook_family {
        family::AGENT_CALL => enrich_agent_call(span, hook_phase, payload),
        family::LLM_GENERATE => enrich_llm_generate(span, hook_phase, payload),
        family::TOOL_CALL => enrich_tool_call(span, hook_phase, payload),
        family::WORKFLOW_RUN => enrich_workflow_run(span, hook_phase, payload),
        family::RPC_REQUEST => enrich_rpc_request(span, hook_phase, payload),
        family::RESOURCE_FETCH => enrich_resource_fetch(span, hook_phase, payload),
        family::PROMPT_APPLY => enrich_prompt_apply(span, hook_phase, payload),
        family::TRANSPORT => enrich_transport(span, hook_phase, payload),
        other => {
            // session-lifecycle/progress carry no span-attribute contract of
            // their own; they feed the event bus (C6) instead. Anything else
            // unrecognized still gets the correlation attribute above and is
            // otherwise ignored, per the "unknown names are no-ops" contract.
            tracing::trace!(family = other, phase = hook_phase, "no span enrichment for hook family");
        }
    }
}

fn enrich_agent_call(span: &dyn RecordingSpan, hook_phase: &str, payload: &HookPayload) {
    if let Some(agent) = payload.get_str("agent") {
        set_scalar(span, "mcp.agent.name", agent.to_string());
    }
    match hook_phase {
        phase::AFTER => {
            if let Some(result) = payload.get("result") {
                set_json(span, "mcp.result.agent_json", result);
            }
        }
        phase::ERROR => {
            if let Some(exc) = payload.get_str("exc") {
                span.set_attribute("mcp.agent.error", AttributeValue::Str(exc.to_string()));
            }
        }
        _ => {}
    }
}

fn enrich_llm_generate(span: &dyn RecordingSpan, hook_phase: &str, payload: &HookPayload) {
    if let Some(llm) = payload.get_str("llm") {
        set_scalar(span, "mcp.llm.model", llm.to_string());
    }
    if let Some(prompt) = payload.get("prompt") {
        set_json(span, "mcp.llm.prompt_json", prompt);
    }
    match hook_phase {
        phase::AFTER => {
            if let Some(response) = payload.get("response") {
                set_json(span, "mcp.llm.response_json", response);
            }
            if let Some(usage) = payload.get("usage") {
                set_json(span, "mcp.llm.usage_json", usage);
            }
        }
        phase::ERROR => {
            if let Some(exc) = payload.get_str("exc") {
                span.set_attribute("mcp.llm.error", AttributeValue::Str(exc.to_string()));
            }
        }
        _ => {}
    }
}

fn enrich_tool_call(span: &dyn RecordingSpan, hook_phase: &str, payload: &HookPayload) {
    if let Some(tool_name) = payload.get_str("tool-name") {
        set_scalar(span, "mcp.tool.name", tool_name.to_string());
    }
    if let Some(args) = payload.get("args") {
        set_json(span, "mcp.tool.args_json", args);
    }
    match hook_phase {
        phase::AFTER => {
            if let Some(result) = payload.get("result") {
                set_json(span, "mcp.tool.result_json", result);
            }
        }
        phase::ERROR => {
            if let Some(exc) = payload.get_str("exc") {
                span.set_attribute("mcp.tool.error", AttributeValue::Str(exc.to_string()));
            }
        }
        _ => {}
    }
}

fn enrich_workflow_run(span: &dyn RecordingSpan, hook_phase: &str, payload: &HookPayload) {
    if let Some(workflow) = payload.get_str("workflow") {
        set_scalar(span, "mcp.workflow.name", workflow.to_string());
    }
    match hook_phase {
        phase::AFTER => {
            if let Some(result) = payload.get("result") {
                set_json(span, "mcp.result.workflow_json", result);
            }
        }
        phase::ERROR => {
            if let Some(exc) = payload.get_str("exc") {
                span.set_attribute("mcp.workflow.error", AttributeValue::Str(exc.to_string()));
            }
        }
        _ => {}
    }
}

fn enrich_rpc_request(span: &dyn RecordingSpan, hook_phase: &str, payload: &HookPayload) {
    if let Some(transport) = payload.get_str("transport") {
        set_scalar(span, "mcp.rpc.transport", transport.to_string());
    }
    if let Some(envelope) = payload.get("envelope") {
        set_json(span, "mcp.rpc.envelope_json", envelope);
    }
    match hook_phase {
        phase::AFTER => {
            if let Some(duration) = payload.get("duration-ms").and_then(Value::as_f64) {
                span.set_attribute("mcp.rpc.duration_ms", AttributeValue::Float(duration));
            }
        }
        phase::ERROR => {
            if let Some(exc) = payload.get_str("exc") {
                span.set_attribute("mcp.rpc.error", AttributeValue::Str(exc.to_string()));
            }
        }
        _ => {}
    }
}

fn enrich_resource_fetch(span: &dyn RecordingSpan, hook_phase: &str, payload: &HookPayload) {
    if let Some(uri) = payload.get_str("uri") {
        set_scalar(span, "mcp.resource.uri", uri.to_string());
    }
    if let Some(mime_type) = payload.get_str("mime-type") {
        set_scalar(span, "mcp.resource.mime_type", mime_type.to_string());
    }
    match hook_phase {
        phase::AFTER => {
            if let Some(content) = payload.get("content") {
                set_json(span, "mcp.resource.content_json", content);
            }
        }
        phase::ERROR => {
            if let Some(exc) = payload.get_str("exc") {
                span.set_attribute("mcp.resource.error", AttributeValue::Str(exc.to_string()));
            }
        }
        _ => {}
    }
}

fn enrich_prompt_apply(span: &dyn RecordingSpan, hook_phase: &str, payload: &HookPayload) {
    if let Some(template_id) = payload.get_str("template-id") {
        set_scalar(span, "mcp.prompt.template_id", template_id.to_string());
    }
    if let Some(parameters) = payload.get("parameters") {
        set_json(span, "mcp.prompt.parameters_json", parameters);
    }
    match hook_phase {
        phase::AFTER => {
            if let Some(rendered) = payload.get_str("rendered") {
                set_scalar(span, "mcp.prompt.rendered", rendered.to_string());
            }
        }
        phase::ERROR => {
            if let Some(exc) = payload.get_str("exc") {
                span.set_attribute("mcp.prompt.error", AttributeValue::Str(exc.to_string()));
            }
        }
        _ => {}
    }
}

fn enrich_transport(span: &dyn RecordingSpan, hook_phase: &str, payload: &HookPayload) {
    if let Some(transport_type) = payload.get_str("transport-type") {
        set_scalar(span, "mcp.transport.type", transport_type.to_string());
    }
    if let Some(uri) = payload.get_str("uri") {
        set_scalar(span, "mcp.transport.uri", uri.to_string());
    }
    if hook_phase == phase::RECONNECTING {
        if let Some(attempt) = payload.get("attempt").and_then(Value::as_i64) {
            span.set_attribute("mcp.transport.attempt", AttributeValue::Int(attempt));
        }
        if let Some(reason) = payload.get_str("reason") {
            set_scalar(span, "mcp.transport.reason", reason.to_string());
        }
    }
}

/// Attach a free-form state snapshot under `mcp.state.<name>_json`, used by
/// workflow code that wants to checkpoint intermediate state outside the
/// fixed hook catalogue.
pub fn capture_state(span: &dyn RecordingSpan, name: &str, value: &Value) {
    set_json(span, &format!("mcp.state.{name}_json"), value);
}

/// Attach an operation's return value under `mcp.result.<name>_json`,
/// the enrichment half of the state-capture decorator described in §4.3.
/// `in_replay` models the "detected to be in a replay context of an
/// external durable workflow engine" skip condition: callers that sit
/// behind a durable-execution replay (e.g. a deterministic workflow
/// re-running history) pass `true` to suppress the write, since
/// re-serializing replayed results would be redundant and, for large
/// payloads, wasted work on every replay pass.
pub fn capture_result(span: &dyn RecordingSpan, name: &str, value: &Value, in_replay: bool) {
    if in_replay {
        return;
    }
    set_json(span, &format!("mcp.result.{name}_json"), value);
}

/// `MAX_JSON_ATTR_BYTES` re-exported for callers that want to pre-check
/// payload size before building a `Value` (e.g. to skip an expensive
/// serialization of something known to be enormous).
pub const MAX_ENRICHED_JSON_BYTES: usize = MAX_JSON_ATTR_BYTES;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    struct FakeSpan {
        recording: bool,
        attrs: RefCell<BTreeMap<String, AttributeValue>>,
    }

    impl FakeSpan {
        fn recording() -> Self {
            Self {
                recording: true,
                attrs: RefCell::new(BTreeMap::new()),
            }
        }

        fn ended() -> Self {
            Self {
                recording: false,
                attrs: RefCell::new(BTreeMap::new()),
            }
        }
    }

    impl RecordingSpan for FakeSpan {
        fn is_recording(&self) -> bool {
            self.recording
        }

        fn set_attribute(&self, key: &str, value: AttributeValue) {
            self.attrs.borrow_mut().insert(key.to_string(), value);
        }
    }

    #[test]
    fn tool_call_before_sets_name_and_args() {
        let span = FakeSpan::recording();
        let payload = HookPayload::new()
            .with("tool-name", "Bash")
            .with("args", serde_json::json!({"cmd": "ls"}));
        enrich(&span, family::TOOL_CALL, phase::BEFORE, &payload);
        let attrs = span.attrs.borrow();
        assert_eq!(
            attrs.get("mcp.tool.name"),
            Some(&AttributeValue::Str("Bash".to_string()))
        );
        assert!(attrs.contains_key("mcp.tool.args_json"));
    }

    #[test]
    fn no_op_when_span_not_recording() {
        let span = FakeSpan::ended();
        let payload = HookPayload::new().with("tool-name", "Bash");
        enrich(&span, family::TOOL_CALL, phase::BEFORE, &payload);
        assert!(span.attrs.borrow().is_empty());
    }

    #[test]
    fn session_correlation_set_when_context_bound() {
        let span = FakeSpan::recording();
        enrich(&span, family::PROGRESS, phase::UPDATE, &HookPayload::new());
        // no session bound in this synchronous test context
        assert!(!span.attrs.borrow().contains_key("session.id"));
    }

    #[test]
    fn oversized_json_value_is_truncated_and_flagged() {
        let span = FakeSpan::recording();
        let huge = "x".repeat(MAX_JSON_ATTR_BYTES * 2);
        let payload = HookPayload::new().with("prompt", serde_json::json!(huge));
        enrich(&span, family::LLM_GENERATE, phase::BEFORE, &payload);
        let attrs = span.attrs.borrow();
        let AttributeValue::Str(stored) = attrs.get("mcp.llm.prompt_json").unwrap() else {
            panic!("expected string attribute");
        };
        assert_eq!(stored.len(), MAX_JSON_ATTR_BYTES);
        assert_eq!(
            attrs.get("mcp.llm.prompt_json_truncated"),
            Some(&AttributeValue::Bool(true))
        );
    }

    #[test]
    fn capture_result_skips_serialization_in_replay() {
        let span = FakeSpan::recording();
        capture_result(&span, "handle_request", &serde_json::json!({"ok": true}), true);
        assert!(span.attrs.borrow().is_empty());
        capture_result(&span, "handle_request", &serde_json::json!({"ok": true}), false);
        assert!(span.attrs.borrow().contains_key("mcp.result.handle_request_json"));
    }
}
