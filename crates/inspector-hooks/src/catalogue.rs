use serde_json::{Map, Value};

/// A hook name: `{family}.{phase}`, e.g. `"tool-call.before"`. Names outside
/// the documented catalogue are accepted and treated as ordinary
/// registration keys — the catalogue below is informational, not an
/// enforced allow-list, per the contract that unknown names are no-ops for
/// any subscriber-less bus.
pub type HookName = String;

/// Build a well-known hook name from `family` and `phase`.
pub fn hook_name(family: &str, phase: &str) -> HookName {
    format!("{family}.{phase}")
}

/// Dynamic payload carried by a hook emission: the documented fields for
/// the family/phase plus a catch-all map for forward-compatible fields.
/// This is the tagged-union-plus-catch-all re-expression of the source's
/// dynamic kwargs, called for in the design notes.
#[derive(Debug, Clone, Default)]
pub struct HookPayload {
    pub fields: Map<String, Value>,
}

impl HookPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

/// Hook families named in the catalogue table. Exposed as constants rather
/// than an enum so callers can freely compose family/phase pairs that
/// aren't yet in the documented table without needing a new variant.
pub mod family {
    pub const AGENT_CALL: &str = "agent-call";
    pub const LLM_GENERATE: &str = "llm-generate";
    pub const TOOL_CALL: &str = "tool-call";
    pub const WORKFLOW_RUN: &str = "workflow-run";
    pub const RPC_REQUEST: &str = "rpc-request";
    pub const RESOURCE_FETCH: &str = "resource-fetch";
    pub const PROMPT_APPLY: &str = "prompt-apply";
    pub const SESSION_LIFECYCLE: &str = "session-lifecycle";
    pub const PROGRESS: &str = "progress";
    pub const TRANSPORT: &str = "transport";
}

pub mod phase {
    pub const BEFORE: &str = "before";
    pub const AFTER: &str = "after";
    pub const ERROR: &str = "error";
    pub const STARTED: &str = "started";
    pub const PAUSED: &str = "paused";
    pub const RESUMED: &str = "resumed";
    pub const FINISHED: &str = "finished";
    pub const UPDATE: &str = "update";
    pub const CANCELLED: &str = "cancelled";
    pub const CONNECTED: &str = "connected";
    pub const DISCONNECTED: &str = "disconnected";
    pub const RECONNECTING: &str = "reconnecting";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_dotted_hook_names() {
        assert_eq!(
            hook_name(family::TOOL_CALL, phase::BEFORE),
            "tool-call.before"
        );
    }

    #[test]
    fn payload_round_trips_through_catch_all_map() {
        let payload = HookPayload::new()
            .with("tool-name", "Bash")
            .with("args", serde_json::json!({"cmd": "ls"}));
        assert_eq!(payload.get_str("tool-name"), Some("Bash"));
        assert!(payload.get("args").is_some());
        assert_eq!(payload.get("missing"), None);
    }
}
