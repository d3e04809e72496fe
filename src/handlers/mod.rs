//! JSON-RPC method handlers on top of the module registry.

pub mod initialize;
pub mod status;
pub mod tools_call;
pub mod tools_list;

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::error::panic_message;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
use crate::registry::ModuleRegistry;

/// Failure of a single method handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Answered with the carried JSON-RPC error.
    #[error("{}", .0.message)]
    Rpc(JsonRpcError),

    /// Unexpected fault; answered with -32603 and counted.
    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Name and version reported to clients.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Running counters served by `server/status`.
#[derive(Debug, Clone, Copy)]
pub struct ServerStats {
    pub started_at: Instant,
    pub request_count: u64,
    pub error_count: u64,
}

impl ServerStats {
    fn new() -> Self {
        Self {
            started_at: Instant::now(),
            request_count: 0,
            error_count: 0,
        }
    }
}

/// Maps JSON-RPC requests onto registry operations.
pub struct McpHandler {
    registry: ModuleRegistry,
    info: ServerInfo,
    initialized: bool,
    stats: ServerStats,
}

impl McpHandler {
    pub fn new(registry: ModuleRegistry, info: ServerInfo) -> Self {
        info!(name = %info.name, version = %info.version, "MCP handler ready");
        Self {
            registry,
            info,
            initialized: false,
            stats: ServerStats::new(),
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn stats(&self) -> ServerStats {
        self.stats
    }

    /// Handle one decoded message.
    ///
    /// Returns `None` for notifications. Never fails: every fault becomes
    /// a JSON-RPC error response.
    pub async fn handle_message(&mut self, message: Value) -> Option<JsonRpcResponse> {
        self.stats.request_count += 1;

        if !message.is_object() {
            return Some(JsonRpcResponse::error(
                RpcId::Null,
                JsonRpcError::invalid_request("Invalid Request: expected a JSON object"),
            ));
        }

        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    RpcId::Null,
                    JsonRpcError::invalid_request(format!("Invalid Request: {e}")),
                ));
            }
        };

        self.handle_request(&request).await
    }

    pub async fn handle_request(&mut self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        debug!(method = request.method(), ?id, "handling request");

        let outcome = match AssertUnwindSafe(self.dispatch(request)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => Err(HandlerError::Internal(format!(
                "panic while handling '{}': {}",
                request.method(),
                panic_message(payload.as_ref())
            ))),
        };

        match outcome {
            Ok(Some(result)) => Some(JsonRpcResponse::success(id, result)),
            Ok(None) => None,
            Err(HandlerError::Rpc(err)) => Some(JsonRpcResponse::error(id, err)),
            Err(fault) => {
                self.stats.error_count += 1;
                error!("error handling message: {fault}");
                Some(JsonRpcResponse::error(id, JsonRpcError::internal_error(fault)))
            }
        }
    }

    async fn dispatch(&mut self, request: &JsonRpcRequest) -> Result<Option<Value>, HandlerError> {
        let params = request.params.as_ref();

        match request.method() {
            "initialize" => {
                let (result, client) = initialize::handle(params, &self.info)?;
                self.initialized = true;
                info!(client = %client, "client connected");
                Ok(Some(result))
            }

            "initialized" | "notifications/initialized" => Ok(None),

            "ping" => Ok(Some(json!({}))),

            "tools/list" => tools_list::handle(&self.registry).map(Some),

            "tools/call" => tools_call::handle(&self.registry, params).await.map(Some),

            "server/status" => status::handle(&self.registry, &self.info, &self.stats)
                .await
                .map(Some),

            method => Err(HandlerError::Rpc(JsonRpcError::method_not_found(method))),
        }
    }
}
