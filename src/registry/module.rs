use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use async_trait::async_trait;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::config::ModuleConfig;
use crate::error::{panic_message, ModuleError};
use crate::schema::ArgumentSchema;

use super::tool::ToolDescriptor;

/// Prefix carried by every failure string returned from tool execution.
pub const FAILURE_PREFIX: &str = "❌";

/// Capability implemented by every tool family.
#[async_trait]
pub trait SecurityModule: Send + Sync {
    /// Describe the tools this module provides. Called once, at construction.
    fn register_tools(&self) -> Result<Vec<ToolDescriptor>, ModuleError>;

    /// Probe external requirements (binaries, credentials, network).
    ///
    /// Must be idempotent: it is called at construction and again on every
    /// availability or status query.
    async fn check_dependencies(&self) -> bool;

    /// Run `tool_name` with already-validated arguments.
    async fn execute(
        &self,
        tool_name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String, ModuleError>;
}

/// Live status snapshot of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStatus {
    pub name: String,
    pub enabled: bool,
    pub available: bool,
    pub tools_count: usize,
    pub tools: Vec<String>,
    pub dependencies_met: bool,
}

/// A constructed module: configuration, registered tools, and the
/// implementation that executes them.
pub struct Module {
    config: ModuleConfig,
    enabled: bool,
    tools: Vec<ToolDescriptor>,
    schemas: HashMap<String, ArgumentSchema>,
    inner: Box<dyn SecurityModule>,
    span: Span,
}

impl Module {
    /// Build a module from its configuration.
    ///
    /// Checks dependencies, then registers tools exactly once. A failed
    /// dependency check or a failing registration disables the module;
    /// neither is reported to the caller.
    pub async fn new(config: ModuleConfig, inner: Box<dyn SecurityModule>) -> Self {
        let span = info_span!("module", name = %config.name);
        let mut module = Self {
            enabled: config.enabled,
            config,
            tools: Vec::new(),
            schemas: HashMap::new(),
            inner,
            span,
        };
        module.initialize().await;
        module
    }

    async fn initialize(&mut self) {
        let span = self.span.clone();
        async {
            info!("initializing module");

            if !self.inner.check_dependencies().await {
                self.enabled = false;
                warn!("module disabled due to missing dependencies");
            }

            match register_guarded(self.inner.as_ref()).and_then(compile_schemas) {
                Ok((tools, schemas)) => {
                    info!(count = tools.len(), "registered tools");
                    self.tools = tools;
                    self.schemas = schemas;
                }
                Err(e) => {
                    error!("failed to register tools: {e}");
                    self.enabled = false;
                }
            }
        }
        .instrument(span)
        .await
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Configuration value for `key`, if set.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.config.get(key)
    }

    /// Tools offered to clients; empty while the module is disabled.
    pub fn get_tools(&self) -> &[ToolDescriptor] {
        if !self.enabled {
            return &[];
        }
        &self.tools
    }

    pub fn get_tool(&self, tool_name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == tool_name)
    }

    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.get_tool(tool_name).is_some()
    }

    /// `enabled` and dependencies met right now.
    pub async fn is_available(&self) -> bool {
        self.enabled && self.inner.check_dependencies().instrument(self.span.clone()).await
    }

    /// Execute a tool, reporting every failure as a string. Panics raised by
    /// the implementation are caught and reported the same way.
    pub async fn safe_execute(&self, tool_name: &str, arguments: &Map<String, Value>) -> String {
        let guarded = AssertUnwindSafe(self.execute_guarded(tool_name, arguments)).catch_unwind();
        match guarded.instrument(self.span.clone()).await {
            Ok(text) => text,
            Err(payload) => {
                let message = format!(
                    "{FAILURE_PREFIX} Error executing '{tool_name}' in module '{}': panicked: {}",
                    self.name(),
                    panic_message(payload.as_ref())
                );
                error!(parent: &self.span, "{message}");
                message
            }
        }
    }

    async fn execute_guarded(&self, tool_name: &str, arguments: &Map<String, Value>) -> String {
        if !self.is_available().await {
            return format!("{FAILURE_PREFIX} Module '{}' is not available", self.name());
        }

        if !self.has_tool(tool_name) {
            return format!(
                "{FAILURE_PREFIX} Tool '{tool_name}' not found in module '{}'",
                self.name()
            );
        }

        if let Some(schema) = self.schemas.get(tool_name) {
            if let Err(e) = schema.check(&Value::Object(arguments.clone())) {
                let message = format!(
                    "{FAILURE_PREFIX} Invalid arguments for '{tool_name}' in module '{}': {e}",
                    self.name()
                );
                warn!("{message}");
                return message;
            }
        }

        let params: Vec<&String> = arguments.keys().collect();
        info!(tool = tool_name, ?params, "executing tool");

        match self.inner.execute(tool_name, arguments).await {
            Ok(result) => {
                info!(tool = tool_name, "tool executed successfully");
                result
            }
            Err(e) => {
                let message = format!(
                    "{FAILURE_PREFIX} Error executing '{tool_name}' in module '{}': {e}",
                    self.name()
                );
                error!("{message}");
                message
            }
        }
    }

    pub async fn status(&self) -> ModuleStatus {
        let dependencies_met = self.inner.check_dependencies().instrument(self.span.clone()).await;
        ModuleStatus {
            name: self.name().to_string(),
            enabled: self.enabled,
            available: self.enabled && dependencies_met,
            tools_count: self.get_tools().len(),
            tools: self.get_tools().iter().map(|t| t.name.clone()).collect(),
            dependencies_met,
        }
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.config.name)
            .field("enabled", &self.enabled)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

/// Call `register_tools`, treating a panic like any other failure.
fn register_guarded(inner: &dyn SecurityModule) -> Result<Vec<ToolDescriptor>, ModuleError> {
    match catch_unwind(AssertUnwindSafe(|| inner.register_tools())) {
        Ok(result) => result,
        Err(payload) => Err(ModuleError::execution(format!(
            "panic during tool registration: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn compile_schemas(
    tools: Vec<ToolDescriptor>,
) -> Result<(Vec<ToolDescriptor>, HashMap<String, ArgumentSchema>), ModuleError> {
    let mut schemas = HashMap::with_capacity(tools.len());
    for tool in &tools {
        let schema = ArgumentSchema::compile(&tool.input_schema).map_err(|e| ModuleError::Schema {
            tool: tool.name.clone(),
            message: e.to_string(),
        })?;
        schemas.entry(tool.name.clone()).or_insert(schema);
    }
    Ok((tools, schemas))
}
