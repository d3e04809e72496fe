use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info};

use crate::config::{ModulesConfig, ServerConfig};
use crate::modules::{builtin_catalog, ModuleConstructor};
use crate::registry::{Module, ModuleRegistry, RegistryStatus};

/// Loader summary reported by `--status`.
#[derive(Debug, Clone, Serialize)]
pub struct LoaderStatus {
    pub modules_directory: String,
    pub config_file: String,
    pub discovered_modules: Vec<String>,
    pub loaded_modules: Vec<String>,
    pub failed_modules: Vec<String>,
    pub registry_status: RegistryStatus,
}

/// Builds modules from a constructor catalog and registers them.
pub struct ModuleLoader {
    catalog: Vec<(&'static str, ModuleConstructor)>,
    configs: ModulesConfig,
    modules_dir: PathBuf,
    config_path: PathBuf,
    registry: ModuleRegistry,
}

impl ModuleLoader {
    /// Loader over the built-in catalog, reading `modules_config.yaml`
    /// from the configured directory.
    pub fn new(config: &ServerConfig) -> Self {
        let config_path = config.modules_config_path();
        let configs = ModulesConfig::load_or_default(&config_path);
        Self::with_catalog(builtin_catalog(), configs)
            .with_paths(config.modules_dir.clone(), config_path)
    }

    pub fn with_catalog(
        catalog: Vec<(&'static str, ModuleConstructor)>,
        configs: ModulesConfig,
    ) -> Self {
        Self {
            catalog,
            configs,
            modules_dir: PathBuf::new(),
            config_path: PathBuf::new(),
            registry: ModuleRegistry::new(),
        }
    }

    fn with_paths(mut self, modules_dir: PathBuf, config_path: PathBuf) -> Self {
        self.modules_dir = modules_dir;
        self.config_path = config_path;
        self
    }

    /// Names of every module this loader can construct.
    pub fn discover_modules(&self) -> Vec<String> {
        self.catalog.iter().map(|(name, _)| name.to_string()).collect()
    }

    /// Construct and register one module.
    ///
    /// Returns `false` when the module is unknown or disabled in config.
    pub async fn load_module(&mut self, name: &str) -> bool {
        let Some(constructor) = self
            .catalog
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, constructor)| *constructor)
        else {
            error!(module = name, "module not found in catalog");
            return false;
        };

        let config = self.configs.module_config(name);
        if !config.enabled {
            info!(module = name, "module is disabled in configuration");
            return false;
        }

        let implementation = constructor(&config);
        let module = Module::new(config, implementation).await;
        self.registry.register(module);
        info!(module = name, "loaded module");
        true
    }

    /// Load every catalog module, or only those named in `only`.
    pub async fn load_all(&mut self, only: Option<&[String]>) -> usize {
        let to_load: Vec<String> = self
            .discover_modules()
            .into_iter()
            .filter(|name| only.map_or(true, |wanted| wanted.iter().any(|w| w == name)))
            .collect();

        let mut loaded = 0;
        for name in &to_load {
            if self.load_module(name).await {
                loaded += 1;
            }
        }

        info!("loaded {loaded}/{} modules", to_load.len());
        loaded
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> ModuleRegistry {
        self.registry
    }

    pub async fn status(&self) -> LoaderStatus {
        let discovered = self.discover_modules();
        let loaded = self.registry.module_names();
        let failed = discovered
            .iter()
            .filter(|name| !loaded.contains(name))
            .cloned()
            .collect();

        LoaderStatus {
            modules_directory: self.modules_dir.display().to_string(),
            config_file: self.config_path.display().to_string(),
            discovered_modules: discovered,
            loaded_modules: loaded,
            failed_modules: failed,
            registry_status: self.registry.status().await,
        }
    }
}
