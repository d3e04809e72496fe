use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool definition exposed over MCP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name; unique within its module and used as the global lookup key.
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
