use crate::config::Config;
use anyhow::{Context, Result};
use inspector_events::EventBus;
use inspector_gateway::{AppState, NoWorkflows, ServerConfig};
use inspector_registry::{LiveRegistry, Registry};
use std::sync::Arc;

pub async fn handle(config: Config, port_override: Option<u16>) -> Result<()> {
    std::fs::create_dir_all(&config.traces_dir)
        .with_context(|| format!("failed to create traces directory {}", config.traces_dir.display()))?;

    let lock = match inspector_export::lock::acquire(&config.traces_dir)? {
        inspector_export::lock::LockOutcome::Acquired(lock) => Some(lock),
        inspector_export::lock::LockOutcome::HeldByPeer { pid } => {
            tracing::warn!(pid, "another mcp-agent-inspector process already owns this traces directory; serving read-only");
            None
        }
    };

    let registry = Arc::new(Registry::new(&config.traces_dir, Arc::new(LiveRegistry::new())));
    let events = Arc::new(EventBus::new());
    let state = AppState::new(registry, events, Arc::new(NoWorkflows), config.traces_dir.clone());

    let server_config = ServerConfig {
        bind_address: config.bind_address,
        port: port_override.unwrap_or(config.port),
    };

    let result = inspector_gateway::serve(state, server_config)
        .await
        .with_context(|| "gateway server exited with an error");

    drop(lock);
    result
}
