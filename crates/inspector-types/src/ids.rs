use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

fn session_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{6,}$").unwrap())
}

/// Validate a session-id against `^[A-Za-z0-9_-]{6,}$`.
pub fn validate_session_id(id: &str) -> Result<()> {
    if session_id_pattern().is_match(id) {
        Ok(())
    } else {
        Err(Error::InvalidSessionId(id.to_string()))
    }
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate a 16-hex span-id.
pub fn validate_span_id(id: &str) -> Result<()> {
    if is_hex(id, 16) {
        Ok(())
    } else {
        Err(Error::InvalidId {
            kind: "span-id",
            value: id.to_string(),
        })
    }
}

/// Validate a 32-hex trace-id.
pub fn validate_trace_id(id: &str) -> Result<()> {
    if is_hex(id, 32) {
        Ok(())
    } else {
        Err(Error::InvalidId {
            kind: "trace-id",
            value: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimum_length_session_id() {
        assert!(validate_session_id("abcdef").is_ok());
    }

    #[test]
    fn rejects_short_session_id() {
        assert!(validate_session_id("abcde").is_err());
    }

    #[test]
    fn rejects_path_traversal_characters() {
        assert!(validate_session_id("../../etc").is_err());
        assert!(validate_session_id("abc/def").is_err());
    }

    #[test]
    fn validates_span_and_trace_id_lengths() {
        assert!(validate_span_id("0123456789abcdef").is_ok());
        assert!(validate_span_id("0123456789abcde").is_err());
        assert!(validate_trace_id(&"a".repeat(32)).is_ok());
        assert!(validate_trace_id(&"a".repeat(31)).is_err());
    }
}
