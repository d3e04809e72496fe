//! Built-in tool families and the catalog used to construct them.

pub mod deps;
pub mod example;

use crate::config::ModuleConfig;
use crate::registry::SecurityModule;

/// Builds a module implementation from its configuration.
pub type ModuleConstructor = fn(&ModuleConfig) -> Box<dyn SecurityModule>;

/// Every module compiled into this binary, in load order.
pub fn builtin_catalog() -> Vec<(&'static str, ModuleConstructor)> {
    vec![(example::MODULE_NAME, example::construct as ModuleConstructor)]
}
