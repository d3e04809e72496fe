use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};

use security_mcp_server::config::ServerConfig;
use security_mcp_server::error::{ConfigError, Result, ServerError};
use security_mcp_server::handlers::{McpHandler, ServerInfo};
use security_mcp_server::loader::{LoaderStatus, ModuleLoader};
use security_mcp_server::logging::{self, LogConfig};
use security_mcp_server::server::McpServer;

/// Modular security tooling served over MCP stdio.
#[derive(Parser)]
#[command(name = "security-mcp-server", version, about)]
struct Cli {
    /// Comma-separated list of modules to load (e.g. nuclei,shodan)
    #[arg(long, value_delimiter = ',')]
    modules: Option<Vec<String>>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Log filter directive, overrides --debug and RUST_LOG
    #[arg(long, env = "SECURITY_MCP_LOG")]
    log_filter: Option<String>,

    /// Show server and module status, then exit
    #[arg(long)]
    status: bool,

    /// Print status as JSON (with --status)
    #[arg(long, requires = "status")]
    json: bool,

    /// Configuration directory path
    #[arg(long, env = "SECURITY_MCP_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Directory reported as the module source
    #[arg(long)]
    modules_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut log_config = if cli.debug { LogConfig::debug() } else { LogConfig::default() };
    if let Some(filter) = &cli.log_filter {
        log_config = log_config.with_filter(filter);
    }
    if let Err(e) = logging::init(&log_config) {
        eprintln!("security-mcp-server: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        error!("fatal error: {e}");
        eprintln!("security-mcp-server: fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(dir) = cli.config_dir {
        config.config_dir = dir;
    }
    if let Some(dir) = cli.modules_dir {
        config.modules_dir = dir;
    }

    let mut loader = ModuleLoader::new(&config);

    if cli.status {
        loader.load_all(None).await;
        let status = loader.status().await;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            print_status(&status);
        }
        return Ok(());
    }

    if let Some(wanted) = &cli.modules {
        info!(?wanted, "loading specific modules");
    }
    let loaded = loader.load_all(cli.modules.as_deref()).await;
    if loaded == 0 {
        return Err(ServerError::Config(ConfigError::Invalid(
            "no modules loaded; check configuration and dependencies".into(),
        )));
    }

    info!("{loaded} modules loaded");
    for tool in loader.registry().all_tools() {
        info!(tool = %tool.name, "{}", tool.description);
    }
    warn!("only use against systems you are authorized to test");

    let handler = McpHandler::new(
        loader.into_registry(),
        ServerInfo {
            name: config.name,
            version: config.version,
        },
    );
    McpServer::new(handler).run().await
}

fn print_status(status: &LoaderStatus) {
    println!("Security MCP Server Status");
    println!("{}", "=".repeat(40));
    println!("  Modules directory: {}", status.modules_directory);
    println!("  Config file:       {}", status.config_file);
    println!("  Discovered:        {}", status.discovered_modules.len());
    println!("  Loaded:            {}", status.loaded_modules.len());
    if !status.failed_modules.is_empty() {
        println!("  Failed:            {}", status.failed_modules.len());
    }

    println!("\n  Module details:");
    for (name, module) in &status.registry_status.modules {
        let icon = if module.enabled && module.available { "✅" } else { "❌" };
        println!("    {icon} {name}: {} tools", module.tools_count);
        if !module.dependencies_met {
            println!("       ⚠️  missing dependencies");
        }
    }

    println!("\n  Total tools available: {}", status.registry_status.total_tools);
}
