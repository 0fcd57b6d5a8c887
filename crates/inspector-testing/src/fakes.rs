//! Fake implementations of the seams external crates would otherwise
//! implement, for tests that need to exercise the registry's external-
//! source merge path without a real workflow service.

use inspector_registry::ExternalSessionSource;
use inspector_types::{Engine, SessionMeta, SessionStatus};
use std::time::Duration;

/// Returns a fixed list of sessions after an optional artificial delay,
/// for exercising both the happy path and the registry's timeout handling.
pub struct FakeExternalSource {
    sessions: Vec<SessionMeta>,
    delay: Option<Duration>,
}

impl FakeExternalSource {
    pub fn new(sessions: Vec<SessionMeta>) -> Self {
        Self { sessions, delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn single_session(session_id: &str) -> Self {
        Self::new(vec![SessionMeta {
            id: session_id.to_string(),
            status: SessionStatus::Running,
            engine: Engine::ExternalWorkflow,
            started_at: chrono::Utc::now(),
            ended_at: None,
            title: session_id.to_string(),
            tags: None,
            span_count: None,
        }])
    }
}

#[async_trait::async_trait]
impl ExternalSessionSource for FakeExternalSource {
    async fn fetch_sessions(&self) -> anyhow::Result<Vec<SessionMeta>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.sessions.clone())
    }
}

/// Always fails, for exercising the registry's `temporal_error` path.
pub struct FailingExternalSource(pub String);

#[async_trait::async_trait]
impl ExternalSessionSource for FailingExternalSource {
    async fn fetch_sessions(&self) -> anyhow::Result<Vec<SessionMeta>> {
        anyhow::bail!(self.0.clone())
    }
}
