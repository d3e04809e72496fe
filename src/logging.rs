//! Process-wide log subscriber.
//!
//! Logs always go to stderr: stdout carries the JSON-RPC stream.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Logging options resolved at startup.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level used when neither `filter` nor `RUST_LOG` is set.
    pub level: Level,
    /// Explicit filter directive, e.g. `security_mcp_server=trace`.
    pub filter: Option<String>,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            filter: None,
            ansi: false,
        }
    }
}

impl LogConfig {
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> EnvFilter {
        if let Some(directive) = &self.filter {
            return EnvFilter::new(directive);
        }
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()))
    }
}

/// Install the global subscriber. Call once, before any module is built.
pub fn init(config: &LogConfig) -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
        .map_err(|e| ServerError::Logging(e.to_string()))
}
