use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON-RPC 2.0 ID. Whatever the client sent is echoed back verbatim;
/// absent → null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(serde_json::Number),
    Str(String),
    #[default]
    Null,
    /// Booleans, arrays and objects, echoed as sent.
    Other(Value),
}

impl From<i64> for RpcId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// JSON-RPC 2.0 request envelope.
///
/// Any JSON object decodes. A missing or non-string `method` is answered
/// with "Method not found" rather than rejected as malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<Value>,
    #[serde(default)]
    pub id: RpcId,
    #[serde(default)]
    pub method: Option<Value>,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<RpcId>, method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: Some(Value::from("2.0")),
            id: id.into(),
            method: Some(Value::from(method)),
            params,
        }
    }

    pub fn method(&self) -> &str {
        self.method.as_ref().and_then(Value::as_str).unwrap_or_default()
    }
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallParams {
    pub name: Option<String>,
    pub arguments: Option<Value>,
}

impl ToolCallParams {
    /// Arguments as an object; absent or null means no arguments.
    pub fn arguments(&self) -> Option<Map<String, Value>> {
        match &self.arguments {
            None | Some(Value::Null) => Some(Map::new()),
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => None,
        }
    }
}
