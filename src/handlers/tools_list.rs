use serde_json::{json, Value};
use tracing::debug;

use crate::registry::ModuleRegistry;

use super::HandlerError;

/// Handle `tools/list`: every tool of every enabled module, in registry order.
pub fn handle(registry: &ModuleRegistry) -> Result<Value, HandlerError> {
    let tools = registry.all_tools();
    debug!(count = tools.len(), "returning tools");
    Ok(json!({ "tools": serde_json::to_value(tools)? }))
}
