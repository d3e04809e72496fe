use serde_json::{json, Value};

use crate::protocol::InitializeParams;

use super::{HandlerError, ServerInfo};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Handle `initialize`.
///
/// Client identity is optional; malformed params are ignored rather than
/// rejected. Returns the result envelope and the reported client name.
pub fn handle(params: Option<&Value>, info: &ServerInfo) -> Result<(Value, String), HandlerError> {
    let params: InitializeParams = params
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    let client = params
        .client_info
        .and_then(|c| c.name)
        .unwrap_or_else(|| "Unknown".to_string());

    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": true }
        },
        "serverInfo": {
            "name": info.name,
            "version": info.version
        }
    });

    Ok((result, client))
}
