//! Security MCP server.
//!
//! Exposes security tooling as MCP tools over JSON-RPC 2.0 stdio. Tools are
//! provided by modules; the registry resolves each tool name to the module
//! that owns it and dispatches the call.

pub mod config;
pub mod error;
pub mod handlers;
pub mod loader;
pub mod logging;
pub mod modules;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod validators;

pub mod schema;
