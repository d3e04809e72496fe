//! Example module: connectivity check and module information.
//!
//! Serves as the template for new tool families.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::config::ModuleConfig;
use crate::error::ModuleError;
use crate::registry::{SecurityModule, ToolDescriptor, FAILURE_PREFIX};
use crate::validators::{sanitize_input, validate_target, TargetKind, DEFAULT_MAX_INPUT_LEN};

use super::deps::missing_binaries;

pub const MODULE_NAME: &str = "example";

const DEFAULT_PING_COUNT: u64 = 4;
const MAX_PING_COUNT: u64 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ExampleModule {
    name: String,
    config: Map<String, Value>,
    dependencies: Vec<String>,
}

impl ExampleModule {
    pub fn from_config(config: &ModuleConfig) -> Self {
        Self {
            name: config.name.clone(),
            config: config.config.clone(),
            dependencies: config.dependencies.clone(),
        }
    }

    fn default_count(&self) -> u64 {
        self.config
            .get("default_count")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_PING_COUNT)
    }

    fn timeout(&self) -> Duration {
        let secs = self
            .config
            .get("timeout_secs")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    async fn ping(&self, arguments: &Map<String, Value>) -> Result<String, ModuleError> {
        let raw_target = arguments
            .get("target")
            .and_then(Value::as_str)
            .ok_or_else(|| ModuleError::InvalidArguments("'target' must be a string".into()))?;
        let target = sanitize_input(raw_target, DEFAULT_MAX_INPUT_LEN);

        let kind = match validate_target(&target) {
            Ok(kind) => kind,
            Err(e) => return Ok(format!("{FAILURE_PREFIX} Invalid target: {e}")),
        };

        let host = match kind {
            TargetKind::Url => Url::parse(&target)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| target.clone()),
            TargetKind::Ip | TargetKind::Domain => target.clone(),
        };
        if host.is_empty() || host.starts_with('-') {
            return Ok(format!("{FAILURE_PREFIX} Invalid target: bad host '{host}'"));
        }

        let count = arguments
            .get("count")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| self.default_count())
            .clamp(1, MAX_PING_COUNT);

        debug!(%host, count, kind = kind.as_str(), "running ping");

        let mut command = Command::new("ping");
        command
            .arg("-c")
            .arg(count.to_string())
            .arg("--")
            .arg(&host)
            .kill_on_drop(true);

        let timeout = self.timeout();
        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| {
                ModuleError::execution(format!("ping timed out after {} seconds", timeout.as_secs()))
            })??;

        if output.status.success() {
            Ok(format!(
                "🏠 Ping Results for {target}:\n\n{}",
                String::from_utf8_lossy(&output.stdout)
            ))
        } else {
            Ok(format!(
                "{FAILURE_PREFIX} Ping failed for {target}:\n{}",
                String::from_utf8_lossy(&output.stderr)
            ))
        }
    }

    fn info(&self) -> Result<String, ModuleError> {
        let tools = self
            .register_tools()?
            .into_iter()
            .map(|t| t.name)
            .collect::<Vec<_>>()
            .join(", ");
        let config = serde_json::to_string(&self.config)?;

        Ok(format!(
            "📄 Example Module Information\n\n\
             Module: {}\n\
             Status: Enabled\n\
             Tools: {tools}\n\
             Config: {config}\n\n\
             This module demonstrates tool registration, input validation, \
             async execution and error reporting. Use it as a template for \
             new security modules.",
            self.name
        ))
    }
}

#[async_trait]
impl SecurityModule for ExampleModule {
    fn register_tools(&self) -> Result<Vec<ToolDescriptor>, ModuleError> {
        Ok(vec![
            ToolDescriptor::new(
                "example_ping",
                "Example ping tool for testing connectivity",
                json!({
                    "type": "object",
                    "properties": {
                        "target": {
                            "type": "string",
                            "description": "Target to ping (IP or domain)"
                        },
                        "count": {
                            "type": "integer",
                            "description": "Number of ping packets",
                            "minimum": 1,
                            "maximum": MAX_PING_COUNT,
                            "default": DEFAULT_PING_COUNT
                        }
                    },
                    "required": ["target"]
                }),
            ),
            ToolDescriptor::new(
                "example_info",
                "Get example module information",
                json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
        ])
    }

    async fn check_dependencies(&self) -> bool {
        let missing = missing_binaries(&self.dependencies);
        if !missing.is_empty() {
            debug!(?missing, "declared dependencies not found");
            return false;
        }

        let mut probe = Command::new("ping");
        probe.args(["-c", "1", "127.0.0.1"]).kill_on_drop(true);

        matches!(
            tokio::time::timeout(PROBE_TIMEOUT, probe.output()).await,
            Ok(Ok(_))
        )
    }

    async fn execute(
        &self,
        tool_name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String, ModuleError> {
        match tool_name {
            "example_ping" => self.ping(arguments).await,
            "example_info" => self.info(),
            other => Err(ModuleError::execution(format!("Unknown tool: {other}"))),
        }
    }
}

pub fn construct(config: &ModuleConfig) -> Box<dyn SecurityModule> {
    Box::new(ExampleModule::from_config(config))
}
