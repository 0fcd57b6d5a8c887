use crate::control::WorkflowControl;
use inspector_events::EventBus;
use inspector_registry::Registry;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state threaded through every axum handler. Cheap to
/// clone (everything inside is an `Arc`), matching the teacher's
/// `AppState` convention.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub events: Arc<EventBus>,
    pub control: Arc<dyn WorkflowControl>,
    pub traces_dir: PathBuf,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, events: Arc<EventBus>, control: Arc<dyn WorkflowControl>, traces_dir: PathBuf) -> Self {
        Self {
            registry,
            events,
            control,
            traces_dir,
        }
    }
}
