use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a session, as exposed over the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Paused,
    Failed,
    Completed,
}

/// Classification of a session's execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    Local,
    ExternalWorkflow,
    InboundRequest,
}

/// `SessionMeta` as returned from `GET /sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub id: String,
    pub status: SessionStatus,
    pub engine: Engine,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_count: Option<u64>,
}

impl SessionMeta {
    /// Duration in milliseconds, if the session has an end time.
    pub fn duration_ms(&self) -> Option<i64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn duration_is_none_until_ended() {
        let meta = SessionMeta {
            id: "abcdef".to_string(),
            status: SessionStatus::Running,
            engine: Engine::Local,
            started_at: Utc::now(),
            ended_at: None,
            title: "t".to_string(),
            tags: None,
            span_count: None,
        };
        assert_eq!(meta.duration_ms(), None);
    }

    #[test]
    fn duration_computed_once_ended() {
        let start = Utc::now();
        let meta = SessionMeta {
            id: "abcdef".to_string(),
            status: SessionStatus::Completed,
            engine: Engine::Local,
            started_at: start,
            ended_at: Some(start + Duration::milliseconds(250)),
            title: "t".to_string(),
            tags: None,
            span_count: Some(3),
        };
        assert_eq!(meta.duration_ms(), Some(250));
    }
}
