//! Session-id path-parameter validation (§4.7): `^[A-Za-z0-9_-]{6,}$`.
//! Applied *after* URL-decoding, per §4.8's security note, which axum
//! already guarantees — `Path<String>` extracts the decoded segment.

use std::sync::OnceLock;

pub fn pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| regex::Regex::new(r"^[A-Za-z0-9_-]{6,}$").unwrap())
}

pub fn is_valid(session_id: &str) -> bool {
    pattern().is_match(session_id)
}
