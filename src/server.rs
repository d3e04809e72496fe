use serde_json::Value;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{info, warn};

use crate::error::Result;
use crate::handlers::McpHandler;
use crate::protocol::{JsonRpcError, JsonRpcResponse, RpcId};

/// Maximum bytes per JSON-RPC message (1 MiB).
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// MCP server that communicates over stdio using newline-delimited JSON-RPC 2.0.
pub struct McpServer {
    handler: McpHandler,
}

impl McpServer {
    pub fn new(handler: McpHandler) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &McpHandler {
        &self.handler
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("security MCP server started (stdio mode)");
        let reader = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let outcome = self.serve(reader, &mut stdout).await;
        info!("MCP server shutdown");
        outcome
    }

    /// Serve requests from `reader` until end of stream, one at a time.
    ///
    /// Unparsable lines are answered with a parse error and do not reach
    /// the handler. I/O failures end the loop.
    pub async fn serve<R, W>(&mut self, mut reader: R, writer: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut raw = Vec::new();

        loop {
            raw.clear();
            let n = (&mut reader)
                .take(MAX_MESSAGE_BYTES as u64 + 1)
                .read_until(b'\n', &mut raw)
                .await?;
            if n == 0 {
                break;
            }

            if n > MAX_MESSAGE_BYTES {
                if raw.last() != Some(&b'\n') {
                    discard_line(&mut reader).await?;
                }
                warn!("message too large (limit {MAX_MESSAGE_BYTES} bytes)");
                write_response(
                    writer,
                    &JsonRpcResponse::error(
                        RpcId::Null,
                        JsonRpcError::parse_error(format!("message exceeds {MAX_MESSAGE_BYTES} bytes")),
                    ),
                )
                .await?;
                continue;
            }

            let trimmed = match std::str::from_utf8(&raw) {
                Ok(s) => s.trim(),
                Err(e) => {
                    write_response(
                        writer,
                        &JsonRpcResponse::error(RpcId::Null, JsonRpcError::parse_error(e)),
                    )
                    .await?;
                    continue;
                }
            };

            if trimmed.is_empty() {
                continue;
            }

            let message: Value = match serde_json::from_str(trimmed) {
                Ok(v) => v,
                Err(e) => {
                    warn!("parse error: {e}");
                    write_response(
                        writer,
                        &JsonRpcResponse::error(RpcId::Null, JsonRpcError::parse_error(e)),
                    )
                    .await?;
                    continue;
                }
            };

            if let Some(resp) = self.handler.handle_message(message).await {
                write_response(writer, &resp).await?;
            }
        }

        Ok(())
    }
}

/// Skip the remainder of the current line without buffering it.
async fn discard_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

async fn write_response<W>(writer: &mut W, resp: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let out = serde_json::to_string(resp)?;
    writer.write_all(out.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
