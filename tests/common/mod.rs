//! Shared fixtures: an in-memory module with controllable behaviour.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use security_mcp_server::config::ModuleConfig;
use security_mcp_server::error::ModuleError;
use security_mcp_server::registry::{Module, SecurityModule, ToolDescriptor};

/// Tool with an empty object schema.
pub fn tool(name: &str) -> ToolDescriptor {
    ToolDescriptor::new(
        name,
        format!("{name} tool"),
        json!({ "type": "object", "properties": {} }),
    )
}

/// Tool requiring a string `target` argument.
pub fn target_tool(name: &str) -> ToolDescriptor {
    ToolDescriptor::new(
        name,
        format!("{name} tool"),
        json!({
            "type": "object",
            "properties": { "target": { "type": "string" } },
            "required": ["target"]
        }),
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Ok,
    Fail,
    Panic,
}

/// Module whose tools echo their label; `fail` always errors and
/// `explode` panics.
pub struct StaticModule {
    label: String,
    tools: Vec<ToolDescriptor>,
    registration: Registration,
    deps_met: Arc<AtomicBool>,
    probes: Arc<AtomicUsize>,
    check_panics: Arc<AtomicBool>,
}

impl StaticModule {
    pub fn new(label: &str, tools: Vec<ToolDescriptor>) -> Self {
        Self {
            label: label.to_string(),
            tools,
            registration: Registration::Ok,
            deps_met: Arc::new(AtomicBool::new(true)),
            probes: Arc::new(AtomicUsize::new(0)),
            check_panics: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn deps_met(self, met: bool) -> Self {
        self.deps_met.store(met, Ordering::SeqCst);
        self
    }

    pub fn registration(mut self, registration: Registration) -> Self {
        self.registration = registration;
        self
    }

    /// Handle for flipping the dependency state after construction.
    pub fn deps_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.deps_met)
    }

    pub fn probe_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.probes)
    }

    /// Handle that makes later dependency checks panic.
    pub fn check_panic_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.check_panics)
    }
}

#[async_trait]
impl SecurityModule for StaticModule {
    fn register_tools(&self) -> Result<Vec<ToolDescriptor>, ModuleError> {
        match self.registration {
            Registration::Ok => Ok(self.tools.clone()),
            Registration::Fail => Err(ModuleError::execution("registration exploded")),
            Registration::Panic => panic!("registration panicked"),
        }
    }

    async fn check_dependencies(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.check_panics.load(Ordering::SeqCst) {
            panic!("dependency check blew up");
        }
        self.deps_met.load(Ordering::SeqCst)
    }

    async fn execute(
        &self,
        tool_name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String, ModuleError> {
        match tool_name {
            "fail" => return Err(ModuleError::execution("scanner crashed")),
            "explode" => panic!("scanner exploded"),
            _ => {}
        }
        Ok(format!(
            "{} ran {tool_name} with {}",
            self.label,
            Value::Object(arguments.clone())
        ))
    }
}

pub async fn build(name: &str, inner: StaticModule) -> Module {
    Module::new(ModuleConfig::new(name), Box::new(inner)).await
}

pub async fn build_with(config: ModuleConfig, inner: StaticModule) -> Module {
    Module::new(config, Box::new(inner)).await
}

pub fn no_args() -> Map<String, Value> {
    Map::new()
}

pub fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
