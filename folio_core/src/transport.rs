use serde_json::Value;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader as AsyncBufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::mcp_server::JsonRpcHandler;
use crate::ConnectorError;

/// Stdio transport for MCP server. One JSON-RPC message per line in each
/// direction; stdout carries nothing but protocol frames.
pub struct StdioTransport {
    handler: JsonRpcHandler,
}

impl StdioTransport {
    pub fn new(handler: JsonRpcHandler) -> Self {
        Self { handler }
    }

    /// Run the stdio transport, reading from stdin and writing to stdout
    /// until stdin is closed.
    pub async fn run(&self) -> io::Result<()> {
        info!("Starting stdio transport");

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            let mut reader = AsyncBufReader::new(tokio::io::stdin());
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!("EOF reached on stdin");
                        break;
                    }
                    Ok(_) => {
                        if !line.trim().is_empty() {
                            if let Err(e) = tx.send(line.clone()) {
                                error!("Failed to send line: {}", e);
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        error!("Error reading from stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            if let Some(response) = self.process_line(&line).await {
                write_response(&mut stdout, &response).await?;
            }
        }

        info!("stdin closed, stopping transport");
        Ok(())
    }

    /// Handle one input line. `None` when the line was a notification.
    pub async fn process_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(request) => self.handler.handle_request(request).await,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                Some(serde_json::json!({
                    "jsonrpc": "2.0",
                    "error": ConnectorError::ParseError.to_jsonrpc_error(),
                    "id": null
                }))
            }
        }
    }
}

/// Write one response frame and flush it.
pub async fn write_response<W>(out: &mut W, response: &Value) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let response_str = serde_json::to_string(response)?;
    out.write_all(response_str.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    debug!(bytes = response_str.len(), "sent response");
    Ok(())
}
