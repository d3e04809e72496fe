use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::error::ConfigError;

/// Default configuration directory, relative to the working directory.
const DEFAULT_CONFIG_DIR: &str = "config";

/// Default directory reported as the module source in loader status.
const DEFAULT_MODULES_DIR: &str = "modules";

/// File name of the per-module configuration inside the config directory.
pub const MODULES_CONFIG_FILE: &str = "modules_config.yaml";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub config_dir: PathBuf,
    pub modules_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "security-mcp-server".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            modules_dir: PathBuf::from(DEFAULT_MODULES_DIR),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `SECURITY_MCP_CONFIG_DIR` (optional, default `config`)
    /// - `SECURITY_MCP_MODULES_DIR` (optional, default `modules`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("SECURITY_MCP_CONFIG_DIR") {
            if dir.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "SECURITY_MCP_CONFIG_DIR must not be empty".into(),
                ));
            }
            config.config_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("SECURITY_MCP_MODULES_DIR") {
            config.modules_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn modules_config_path(&self) -> PathBuf {
        self.config_dir.join(MODULES_CONFIG_FILE)
    }
}

/// Configuration record handed to a module at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleConfig {
    pub name: String,
    pub enabled: bool,
    pub config: Map<String, Value>,
    pub dependencies: Vec<String>,
}

impl ModuleConfig {
    /// Defaults for a module with no configuration entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            config: Map::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }
}

/// One entry of `modules_config.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ModuleEntry {
    enabled: Option<bool>,
    config: Option<Map<String, Value>>,
    dependencies: Option<Vec<String>>,
}

/// Per-module configuration keyed by module name.
#[derive(Debug, Clone, Default)]
pub struct ModulesConfig {
    entries: HashMap<String, ModuleEntry>,
}

impl ModulesConfig {
    /// Parse the YAML mapping `module name → {enabled, config, dependencies}`.
    ///
    /// An empty document yields an empty configuration.
    pub fn from_yaml(source: &str, path: &str) -> Result<Self, ConfigError> {
        let entries: Option<HashMap<String, Option<ModuleEntry>>> =
            serde_yaml::from_str(source).map_err(|e| ConfigError::Yaml {
                path: path.to_string(),
                source: e,
            })?;

        let entries = entries
            .unwrap_or_default()
            .into_iter()
            .map(|(name, entry)| (name, entry.unwrap_or_default()))
            .collect();

        Ok(Self { entries })
    }

    /// Read the configuration file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&source, &path.display().to_string())
    }

    /// Load the configuration, falling back to an empty one.
    ///
    /// A missing file is logged as a warning; an unreadable or malformed
    /// file is logged as an error. Neither aborts startup.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "module config file not found");
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!(path = %path.display(), modules = config.entries.len(), "loaded module configs");
                config
            }
            Err(e) => {
                error!("failed to load module configs: {e}");
                Self::default()
            }
        }
    }

    /// Resolve the configuration for `name`, applying defaults for
    /// anything the file does not set.
    pub fn module_config(&self, name: &str) -> ModuleConfig {
        let defaults = ModuleConfig::new(name);
        match self.entries.get(name) {
            Some(entry) => ModuleConfig {
                name: name.to_string(),
                enabled: entry.enabled.unwrap_or(defaults.enabled),
                config: entry.config.clone().unwrap_or(defaults.config),
                dependencies: entry.dependencies.clone().unwrap_or(defaults.dependencies),
            },
            None => defaults,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
