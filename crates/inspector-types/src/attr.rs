use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum UTF-8 byte length of a single `*_json` attribute value before truncation.
pub const MAX_JSON_ATTR_BYTES: usize = 30_720;

/// A single span/event attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Str(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Str(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

/// Ordered attribute map. `BTreeMap` keeps export output deterministic,
/// which matters for the byte-for-byte round-trip property in trace files.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Truncate `s` to at most `max_bytes` UTF-8 bytes, respecting char boundaries.
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Set a `*_json` attribute on `attrs`, serializing `value` to a compact JSON
/// string and applying the truncation rule: if the serialized form exceeds
/// [`MAX_JSON_ATTR_BYTES`], the stored value is truncated to that many bytes
/// (on a char boundary) and a companion `{key}_truncated = true` attribute is
/// set. Truncation never re-parses the result.
pub fn set_json_attr(attrs: &mut AttributeMap, key: &str, value: &serde_json::Value) {
    debug_assert!(key.ends_with("_json"), "attribute key must end in _json");
    let serialized = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
    if serialized.len() <= MAX_JSON_ATTR_BYTES {
        attrs.insert(key.to_string(), AttributeValue::Str(serialized));
    } else {
        let truncated = truncate_utf8(&serialized, MAX_JSON_ATTR_BYTES).to_string();
        attrs.insert(key.to_string(), AttributeValue::Str(truncated));
        attrs.insert(format!("{key}_truncated"), AttributeValue::Bool(true));
    }
}
