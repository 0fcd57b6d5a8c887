//! HTTP gateway (C7/C8): the `/_inspector/*` control-plane surface, mounted
//! either inside the embedding process's own axum `Router` or served
//! standalone via [`server::serve`].

pub mod control;
pub mod error;
pub mod router;
pub mod routes;
pub mod server;
pub mod session_id;
pub mod state;
pub mod trace_stream;

pub use control::{ControlError, NoWorkflows, SignalKind, SignalRequest, WorkflowControl};
pub use error::InspectorError;
pub use router::build_router;
pub use server::{serve, ServerConfig, DEFAULT_PORT};
pub use state::AppState;
