//! In-memory live registry of sessions not yet (or not fully) flushed to
//! disk. Populated by session-lifecycle hook subscribers; consulted by
//! [`crate::Registry::list`] and takes precedence over file-derived status
//! (§4.5 step 2).

use inspector_types::{Engine, SessionMeta, SessionStatus};
use std::collections::HashMap;
use std::sync::RwLock;

/// What the live registry remembers about one session: enough to override
/// file-derived status, plus full metadata for sessions whose trace file
/// hasn't been created yet (a brand-new session with no spans exported).
#[derive(Debug, Clone)]
pub struct LiveSession {
    pub meta: SessionMeta,
}

#[derive(Default)]
pub struct LiveRegistry {
    sessions: RwLock<HashMap<String, LiveSession>>,
}

impl LiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `SessionStarted` observation.
    pub fn started(&self, session_id: &str, engine: Engine, title: Option<String>, started_at: chrono::DateTime<chrono::Utc>) {
        let meta = SessionMeta {
            id: session_id.to_string(),
            status: SessionStatus::Running,
            engine,
            started_at,
            ended_at: None,
            title: title.unwrap_or_else(|| session_id.to_string()),
            tags: None,
            span_count: None,
        };
        self.sessions
            .write()
            .expect("live registry poisoned")
            .insert(session_id.to_string(), LiveSession { meta });
    }

    /// Record a status transition (`SessionPaused`/`SessionResumed`/
    /// `SessionFinished`) for a session already known to the registry. A
    /// transition for an unknown session is ignored — the file-derived
    /// listing will pick it up once its trace file exists.
    pub fn set_status(&self, session_id: &str, status: SessionStatus, ended_at: Option<chrono::DateTime<chrono::Utc>>) {
        let mut sessions = self.sessions.write().expect("live registry poisoned");
        if let Some(live) = sessions.get_mut(session_id) {
            live.meta.status = status;
            if ended_at.is_some() {
                live.meta.ended_at = ended_at;
            }
        }
    }

    /// Drop a session from the live registry, e.g. once its trace file
    /// has fully flushed and file-derived metadata is authoritative.
    pub fn remove(&self, session_id: &str) {
        self.sessions.write().expect("live registry poisoned").remove(session_id);
    }

    pub fn get(&self, session_id: &str) -> Option<LiveSession> {
        self.sessions.read().expect("live registry poisoned").get(session_id).cloned()
    }

    pub fn snapshot(&self) -> Vec<LiveSession> {
        self.sessions.read().expect("live registry poisoned").values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_session_is_running() {
        let registry = LiveRegistry::new();
        registry.started("abcdef", Engine::Local, Some("demo".to_string()), chrono::Utc::now());
        assert_eq!(registry.get("abcdef").unwrap().meta.status, SessionStatus::Running);
    }

    #[test]
    fn paused_then_resumed_transitions_tracked() {
        let registry = LiveRegistry::new();
        registry.started("abcdef", Engine::Local, None, chrono::Utc::now());
        registry.set_status("abcdef", SessionStatus::Paused, None);
        assert_eq!(registry.get("abcdef").unwrap().meta.status, SessionStatus::Paused);
        registry.set_status("abcdef", SessionStatus::Running, None);
        assert_eq!(registry.get("abcdef").unwrap().meta.status, SessionStatus::Running);
    }

    #[test]
    fn status_for_unknown_session_is_ignored() {
        let registry = LiveRegistry::new();
        registry.set_status("ghijkl", SessionStatus::Failed, None);
        assert!(registry.get("ghijkl").is_none());
    }

    #[test]
    fn remove_drops_the_session() {
        let registry = LiveRegistry::new();
        registry.started("abcdef", Engine::Local, None, chrono::Utc::now());
        registry.remove("abcdef");
        assert!(registry.get("abcdef").is_none());
    }
}
