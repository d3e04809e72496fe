use serde_json::{json, Value};

use crate::registry::ModuleRegistry;

use super::{HandlerError, ServerInfo, ServerStats};

/// Handle `server/status`: uptime, counters, and a live registry snapshot.
pub async fn handle(
    registry: &ModuleRegistry,
    info: &ServerInfo,
    stats: &ServerStats,
) -> Result<Value, HandlerError> {
    let modules = registry.status().await;

    Ok(json!({
        "server": {
            "name": info.name,
            "version": info.version,
            "uptime_seconds": stats.started_at.elapsed().as_secs(),
            "requests_handled": stats.request_count,
            "errors": stats.error_count
        },
        "modules": serde_json::to_value(modules)?
    }))
}
