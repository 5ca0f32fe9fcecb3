//! Client side of the MCP stdio transport.
//!
//! Spawns a server subprocess with piped stdio, runs the `initialize`
//! handshake once, then issues `tools/list` / `tools/call` requests. One
//! request is in flight at a time; responses are matched by id and stray
//! notification lines are skipped.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::McpServerConfig;

use super::protocol::{
    CallToolResult, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ToolDescriptor,
};

#[derive(Debug, Error)]
pub enum McpClientError {
    #[error("Failed to launch MCP server '{0}': {1}")]
    Spawn(String, std::io::Error),

    #[error("MCP server '{0}' closed its stdout")]
    Disconnected(String),

    #[error("I/O error talking to MCP server '{0}': {1}")]
    Io(String, std::io::Error),

    #[error("Malformed response from MCP server '{0}': {1}")]
    Malformed(String, String),

    #[error("MCP server '{0}' returned error {1}: {2}")]
    Rpc(String, i32, String),

    #[error("Tool '{0}' failed: {1}")]
    ToolError(String, String),
}

#[derive(Debug)]
struct Stdio {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Connection to one running MCP server subprocess.
///
/// The child is kept alive for the lifetime of the client; dropping the
/// client closes its stdin, which lets a well-behaved server exit.
#[derive(Debug)]
pub struct McpClient {
    name: String,
    _child: Child,
    stdio: Mutex<Stdio>,
    next_id: AtomicU64,
}

impl McpClient {
    /// Launch the configured server and complete the initialize handshake.
    ///
    /// Any failure here is a startup configuration error; there is no retry.
    pub async fn connect(config: &McpServerConfig) -> Result<Self, McpClientError> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| McpClientError::Spawn(config.name.clone(), e))?;

        let stdin = child.stdin.take().ok_or_else(|| {
            McpClientError::Malformed(config.name.clone(), "no stdin handle".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            McpClientError::Malformed(config.name.clone(), "no stdout handle".to_string())
        })?;

        let client = Self {
            name: config.name.clone(),
            _child: child,
            stdio: Mutex::new(Stdio {
                stdin,
                stdout: BufReader::new(stdout),
            }),
            next_id: AtomicU64::new(1),
        };

        client.initialize().await?;
        info!("Connected to MCP server '{}'", client.name);
        Ok(client)
    }

    /// Server label from the configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<(), McpClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let response = self
            .request(JsonRpcRequest::initialize(id, "study-coach"))
            .await?;
        let version = response
            .result
            .as_ref()
            .and_then(|r| r["protocolVersion"].as_str())
            .unwrap_or("unknown");
        debug!("server '{}' speaks protocol {}", self.name, version);

        // The handshake ends with a fire-and-forget notification.
        let note = JsonRpcRequest::notification("notifications/initialized");
        let mut stdio = self.stdio.lock().await;
        write_message(&mut stdio.stdin, &self.name, &note).await
    }

    /// Fetch the server's published tool descriptors.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let response = self.request(JsonRpcRequest::list_tools(id)).await?;
        let result = response.result.ok_or_else(|| {
            McpClientError::Malformed(self.name.clone(), "tools/list without result".to_string())
        })?;
        let listed: ListToolsResult = serde_json::from_value(result)
            .map_err(|e| McpClientError::Malformed(self.name.clone(), e.to_string()))?;
        Ok(listed.tools)
    }

    /// Invoke a tool and return its text output.
    ///
    /// A result with the error flag set becomes `McpClientError::ToolError`
    /// carrying the content text, so callers can relay it verbatim.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, McpClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let response = self
            .request(JsonRpcRequest::call_tool(id, name, arguments))
            .await?;
        let result = response.result.ok_or_else(|| {
            McpClientError::Malformed(self.name.clone(), "tools/call without result".to_string())
        })?;
        let call: CallToolResult = serde_json::from_value(result)
            .map_err(|e| McpClientError::Malformed(self.name.clone(), e.to_string()))?;

        let text = call.joined_text();
        if call.is_error {
            return Err(McpClientError::ToolError(name.to_string(), text));
        }
        Ok(text)
    }

    /// Send one request and block until its response arrives.
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpClientError> {
        let want_id = request.id.unwrap_or(0);
        let mut stdio = self.stdio.lock().await;

        write_message(&mut stdio.stdin, &self.name, &request).await?;

        loop {
            let mut line = String::new();
            let read = stdio
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| McpClientError::Io(self.name.clone(), e))?;
            if read == 0 {
                return Err(McpClientError::Disconnected(self.name.clone()));
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Servers may interleave notifications; only a response with our
            // id completes the turn.
            let Ok(response) = serde_json::from_str::<JsonRpcResponse>(line) else {
                debug!("skipping non-response line from '{}'", self.name);
                continue;
            };
            if response.id != want_id {
                debug!("skipping response {} while waiting for {}", response.id, want_id);
                continue;
            }

            if let Some(error) = response.error {
                return Err(McpClientError::Rpc(
                    self.name.clone(),
                    error.code,
                    error.message,
                ));
            }
            return Ok(response);
        }
    }
}

async fn write_message(
    stdin: &mut ChildStdin,
    server: &str,
    message: &JsonRpcRequest,
) -> Result<(), McpClientError> {
    let mut payload = serde_json::to_string(message)
        .map_err(|e| McpClientError::Malformed(server.to_string(), e.to_string()))?;
    payload.push('\n');
    stdin
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| McpClientError::Io(server.to_string(), e))?;
    stdin
        .flush()
        .await
        .map_err(|e| McpClientError::Io(server.to_string(), e))
}
