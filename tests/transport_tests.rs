//! End-to-end tests over the newline-delimited transport.

mod common;

use serde_json::Value;
use tokio::io::BufReader;

use common::{build, tool, StaticModule};
use security_mcp_server::handlers::{McpHandler, ServerInfo};
use security_mcp_server::protocol::{INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR};
use security_mcp_server::registry::ModuleRegistry;
use security_mcp_server::server::McpServer;

async fn ping_server() -> McpServer {
    let mut registry = ModuleRegistry::new();
    registry.register(build("net", StaticModule::new("net", vec![tool("ping")])).await);
    McpServer::new(McpHandler::new(
        registry,
        ServerInfo {
            name: "security-mcp-server".into(),
            version: "test".into(),
        },
    ))
}

/// Feed `input` through the transport and return one JSON value per output line.
async fn run_session(server: &mut McpServer, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    server
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.is_empty() || text.ends_with('\n'));
    text.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn tools_list_scenario() {
    let mut server = ping_server().await;
    let out = run_session(&mut server, "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n").await;

    assert_eq!(out.len(), 1);
    let tools = out[0]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "ping");
}

#[tokio::test]
async fn unknown_tool_scenario() {
    let mut server = ping_server().await;
    let out = run_session(
        &mut server,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"unknown_tool","arguments":{}}}"#,
    )
    .await;

    assert_eq!(out.len(), 1);
    assert!(out[0].get("error").is_none());
    let text = out[0]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("not found"));
}

#[tokio::test]
async fn missing_tool_name_scenario() {
    let mut server = ping_server().await;
    let out = run_session(
        &mut server,
        "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"tools/call\",\"params\":{}}\n",
    )
    .await;

    assert_eq!(out[0]["error"]["code"], INVALID_PARAMS);
    assert_eq!(out[0]["id"], 3);
}

#[tokio::test]
async fn parse_error_scenario() {
    let mut server = ping_server().await;
    let out = run_session(&mut server, "{bad json\n").await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["jsonrpc"], "2.0");
    assert_eq!(out[0]["error"]["code"], PARSE_ERROR);
    assert!(out[0]["id"].is_null());
    assert!(out[0].as_object().unwrap().contains_key("id"));
}

#[tokio::test]
async fn unknown_method_scenario() {
    let mut server = ping_server().await;
    let out = run_session(&mut server, "{\"jsonrpc\":\"2.0\",\"id\":4,\"method\":\"bogus/method\"}\n").await;

    assert_eq!(out[0]["error"]["code"], METHOD_NOT_FOUND);
}

#[tokio::test]
async fn session_keeps_order_and_skips_blank_lines() {
    let mut server = ping_server().await;
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        "\n",
        "   \n",
        "{not json}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"tools/call\",\"params\":{\"name\":\"ping\"}}"
    );

    let out = run_session(&mut server, input).await;

    assert_eq!(out.len(), 4);
    assert_eq!(out[0]["id"], 1);
    assert_eq!(out[1]["error"]["code"], PARSE_ERROR);
    assert_eq!(out[2]["id"], 2);
    assert_eq!(out[3]["id"], 3);
    assert_eq!(out[3]["result"]["content"][0]["text"], "net ran ping with {}");
    assert!(server.handler().is_initialized());
}

#[tokio::test]
async fn parse_errors_do_not_reach_handler() {
    let mut server = ping_server().await;
    let input = "{bad\nnot json either\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"server/status\"}\n";

    let out = run_session(&mut server, input).await;

    assert_eq!(out.len(), 3);
    assert_eq!(out[2]["result"]["server"]["requests_handled"], 1);
    assert_eq!(server.handler().stats().request_count, 1);
}

#[tokio::test]
async fn invalid_utf8_is_a_parse_error() {
    let mut server = ping_server().await;
    let mut output = Vec::new();
    let input: &[u8] = b"\xff\xfe\n";

    server.serve(BufReader::new(input), &mut output).await.unwrap();

    let line: Value = serde_json::from_slice(output.strip_suffix(b"\n").unwrap()).unwrap();
    assert_eq!(line["error"]["code"], PARSE_ERROR);
}

#[tokio::test]
async fn oversized_line_is_rejected_and_session_continues() {
    let mut server = ping_server().await;
    let huge = format!("{{\"pad\":\"{}\"}}", "x".repeat(1024 * 1024 + 16));
    let input = format!("{huge}\n{{\"jsonrpc\":\"2.0\",\"id\":5,\"method\":\"tools/list\"}}\n");

    let out = run_session(&mut server, &input).await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["error"]["code"], PARSE_ERROR);
    assert!(out[0]["id"].is_null());
    assert_eq!(out[1]["id"], 5);
    assert_eq!(out[1]["result"]["tools"][0]["name"], "ping");
    assert_eq!(server.handler().stats().request_count, 1);
}

#[tokio::test]
async fn oversized_final_line_without_newline_is_rejected() {
    let mut server = ping_server().await;
    let input = "y".repeat(3 * 1024 * 1024);

    let out = run_session(&mut server, &input).await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["error"]["code"], PARSE_ERROR);
}

#[tokio::test]
async fn empty_input_ends_cleanly() {
    let mut server = ping_server().await;
    let out = run_session(&mut server, "").await;
    assert!(out.is_empty());
}
