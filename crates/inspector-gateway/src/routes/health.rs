use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({
        "name": "mcp-agent-inspector",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
