//! Optional external workflow-service query (§4.5 step 3), applied with a
//! short timeout and graceful degradation on failure.

use inspector_types::SessionMeta;
use std::time::Duration;

/// Default timeout for an external workflow-service query (§5).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Implemented by whatever client talks to the external durable-workflow
/// service. Kept as a trait so the registry never depends on a concrete
/// HTTP/gRPC client, and so tests can substitute a fake.
#[async_trait::async_trait]
pub trait ExternalSessionSource: Send + Sync {
    async fn fetch_sessions(&self) -> anyhow::Result<Vec<SessionMeta>>;
}

/// Query `source` with a hard timeout, collapsing both a timeout and a
/// source-level error into a single human-readable `temporal_error`
/// string. Never returns `Err`: the registry always has *something* to
/// show, even if it's just the local sessions plus this message.
pub async fn fetch_with_timeout(
    source: &dyn ExternalSessionSource,
    timeout: Duration,
) -> Result<Vec<SessionMeta>, String> {
    match tokio::time::timeout(timeout, source.fetch_sessions()).await {
        Ok(Ok(sessions)) => Ok(sessions),
        Ok(Err(err)) => Err(format!("external workflow query failed: {err}")),
        Err(_) => Err(format!("external workflow query timed out after {timeout:?}")),
    }
}
