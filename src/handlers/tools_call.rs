use serde_json::Value;
use tracing::info;

use crate::protocol::{JsonRpcError, ToolCallParams, ToolResult};
use crate::registry::ModuleRegistry;

use super::HandlerError;

/// Handle `tools/call`.
///
/// Only a missing tool name or non-object arguments are protocol errors.
/// Unknown tools, unavailable modules and execution failures come back as
/// text inside a successful result.
pub async fn handle(registry: &ModuleRegistry, params: Option<&Value>) -> Result<Value, HandlerError> {
    let params: ToolCallParams = match params {
        Some(v @ Value::Object(_)) => serde_json::from_value(v.clone()).map_err(|e| {
            HandlerError::Rpc(JsonRpcError::invalid_params(format!(
                "Invalid tools/call params: {e}"
            )))
        })?,
        _ => ToolCallParams::default(),
    };

    let name = match params.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(HandlerError::Rpc(JsonRpcError::invalid_params("Missing tool name"))),
    };

    let arguments = params.arguments().ok_or_else(|| {
        HandlerError::Rpc(JsonRpcError::invalid_params("Tool arguments must be an object"))
    })?;

    info!(tool = name, "executing tool");
    let text = registry.dispatch(name, &arguments).await;

    Ok(serde_json::to_value(ToolResult::text(text))?)
}
