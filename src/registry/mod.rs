//! Module registry: owns every constructed module and resolves tool names
//! to the module that executes them.

pub mod module;
pub mod tool;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

pub use module::{Module, ModuleStatus, SecurityModule, FAILURE_PREFIX};
pub use tool::ToolDescriptor;

/// Aggregate status of all registered modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryStatus {
    pub total_modules: usize,
    pub enabled_modules: usize,
    pub total_tools: usize,
    pub modules: BTreeMap<String, ModuleStatus>,
}

/// Modules keyed by name, enumerated in registration order.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `module`, replacing any module already registered under its name.
    ///
    /// Tool names already served by another enabled module are logged: the
    /// earlier module keeps answering for them.
    pub fn register(&mut self, module: Module) {
        for tool in module.get_tools() {
            if let Some(owner) = self.find_owner(&tool.name) {
                if owner.name() != module.name() {
                    warn!(
                        tool = %tool.name,
                        owner = owner.name(),
                        shadowed = module.name(),
                        "duplicate tool name; first registered module wins"
                    );
                }
            }
        }

        let name = module.name().to_string();
        match self.modules.iter_mut().find(|m| m.name() == name) {
            Some(slot) => *slot = module,
            None => self.modules.push(module),
        }
        info!(module = %name, "registered module");
    }

    pub fn get_module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn all_modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn enabled_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|m| m.enabled())
    }

    pub fn all_tools(&self) -> Vec<&ToolDescriptor> {
        self.enabled_modules().flat_map(|m| m.get_tools()).collect()
    }

    /// First enabled module, in registration order, that provides `tool_name`.
    pub fn find_owner(&self, tool_name: &str) -> Option<&Module> {
        self.enabled_modules().find(|m| m.has_tool(tool_name))
    }

    /// Run `tool_name` on its owning module. Failures come back as text.
    pub async fn dispatch(&self, tool_name: &str, arguments: &Map<String, Value>) -> String {
        match self.find_owner(tool_name) {
            Some(module) => module.safe_execute(tool_name, arguments).await,
            None => format!("{FAILURE_PREFIX} Tool '{tool_name}' not found in any enabled module"),
        }
    }

    pub async fn status(&self) -> RegistryStatus {
        let mut modules = BTreeMap::new();
        for module in &self.modules {
            modules.insert(module.name().to_string(), module.status().await);
        }

        RegistryStatus {
            total_modules: self.modules.len(),
            enabled_modules: self.enabled_modules().count(),
            total_tools: self.all_tools().len(),
            modules,
        }
    }
}
